use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct StylistInputDoc {
    pub name: String,
    pub role: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(utoipa::ToSchema)]
pub struct StylistPatchDoc {
    pub name: Option<String>,
    pub role: Option<String>,
    pub bio: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(utoipa::ToSchema)]
pub struct StyleImageInputDoc {
    pub title: String,
    pub category: String,
    pub image_url: String,
}

#[derive(utoipa::ToSchema)]
pub struct MenuItemInputDoc {
    pub name: String,
    pub description: Option<String>,
    pub price_yen: u32,
    pub duration_min: u32,
    pub category: String,
}

#[derive(utoipa::ToSchema)]
pub struct NewsItemInputDoc {
    pub title: String,
    pub body: String,
    pub published_on: String,
}

#[derive(utoipa::ToSchema)]
pub struct ContactMessageInputDoc {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::session::issue_csrf,
        crate::routes::content::list_stylists,
        crate::routes::content::list_styles,
        crate::routes::content::list_menu,
        crate::routes::content::list_news,
        crate::routes::content::get_salon,
        crate::routes::content::submit_contact,
        crate::routes::admin::create_stylist,
        crate::routes::admin::update_stylist,
        crate::routes::admin::create_style,
        crate::routes::admin::update_style,
        crate::routes::admin::create_menu_item,
        crate::routes::admin::update_menu_item,
        crate::routes::admin::create_news_item,
        crate::routes::admin::update_news_item,
        crate::routes::admin::update_salon,
        crate::routes::admin::list_messages,
    ),
    components(
        schemas(
            HealthResponse,
            StylistInputDoc,
            StylistPatchDoc,
            StyleImageInputDoc,
            MenuItemInputDoc,
            NewsItemInputDoc,
            ContactMessageInputDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "session"),
        (name = "content"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
