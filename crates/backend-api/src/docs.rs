use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mercado API",
        description = "Product catalog, chat history and realtime updates"
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::diagnostics::logger_test,
        crate::routes::products::list_products,
        crate::routes::products::create_product,
        crate::routes::products::get_product,
        crate::routes::products::delete_product,
        crate::routes::messages::list_messages,
        crate::routes::messages::create_message,
        crate::routes::uploads::upload_files,
        crate::routes::websocket::websocket_handler
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::products::ConfirmationResponse,
            crate::routes::messages::CreateMessageRequest,
            crate::routes::messages::MessageResponse,
            crate::routes::uploads::UploadedFile,
            crate::routes::uploads::UploadResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Products", description = "Catalog operations; mutations are broadcast to realtime clients"),
        (name = "Messages", description = "Chat history"),
        (name = "Uploads", description = "Image and document uploads"),
        (name = "Realtime", description = "WebSocket event stream")
    )
)]
pub struct ApiDoc;
