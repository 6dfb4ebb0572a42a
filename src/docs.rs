use utoipa::OpenApi;
use crate::modules::image::dto::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::image::handler::upload_image,
        crate::modules::image::handler::get_image,
        crate::modules::image::handler::transform_image,
    ),
    components(
        schemas(
            ImageResponse, UploadImageForm, TransformImageRequest, TransformRequest,
            ResizeOptions, CropOptions, FilterOptions,
        )
    ),
    tags(
        (name = "Images", description = "Image upload and asynchronous transforms")
    )
)]
pub struct ApiDoc;
