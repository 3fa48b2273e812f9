use crate::error::ApiError;
use crate::helper::{locale_helpers, reading_time_helpers};
use crate::models::db_operations::{content_db_operations, site_db_operations};
use crate::models::{ContentKind, ContentRecord, GalleryKind, Locale, MemberKind, OfficerKind};
use crate::DbPool;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Deserialize)]
pub struct ListQuery {
    locale: Option<Locale>,
    limit: Option<u32>,
    offset: Option<u32>,
}

#[derive(Deserialize)]
pub struct LocaleQuery {
    locale: Option<Locale>,
}

#[derive(Deserialize)]
pub struct TogglePathQuery {
    path: String,
}

/// Detail view model: the stored record plus the derived fields the pages
/// need (reading time for articles, the translation counterpart's path).
#[derive(Serialize)]
struct ContentDetail {
    #[serde(flatten)]
    record: ContentRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    reading_time_minutes: Option<u32>,
    translation_path: Option<String>,
}

pub fn config_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/is_server_active", web::get().to(is_server_active))
            .route("/locale/toggle", web::get().to(toggle_locale))
            .route("/news", web::get().to(list_news))
            .route("/news/{slug}", web::get().to(get_news))
            .route("/articles", web::get().to(list_articles))
            .route("/articles/{slug}", web::get().to(get_article))
            .route("/projects", web::get().to(list_projects))
            .route("/projects/{slug}", web::get().to(get_project))
            .route("/services", web::get().to(list_services))
            .route("/services/{slug}", web::get().to(get_service))
            .route("/notices", web::get().to(list_notices))
            .route("/notices/{slug}", web::get().to(get_notice))
            .route("/popups/active", web::get().to(get_active_popups))
            .route("/board_members", web::get().to(list_board_members))
            .route("/audit_board_members", web::get().to(list_audit_board_members))
            .route("/sponsors", web::get().to(list_sponsors))
            .route("/gallery/photos", web::get().to(list_photo_gallery))
            .route("/gallery/videos", web::get().to(list_video_gallery))
            .route("/contact_info", web::get().to(get_contact_info))
            .route("/president", web::get().to(get_president))
            .route("/representative", web::get().to(get_representative)),
    );
}

async fn is_server_active() -> impl Responder {
    HttpResponse::Ok().body("active")
}

async fn toggle_locale(query: web::Query<TogglePathQuery>) -> Result<HttpResponse, ApiError> {
    if !query.path.starts_with('/') {
        return Err(ApiError::Validation(
            "path must be site-relative and start with '/'".to_string(),
        ));
    }
    let toggled = locale_helpers::toggle_locale_path(&query.path);
    Ok(HttpResponse::Ok().json(json!({ "path": toggled })))
}

// --- Slugged content ---

async fn list_content(
    pool: web::Data<DbPool>,
    kind: ContentKind,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let limit = query.limit.unwrap_or(20).min(100);
    let offset = query.offset.unwrap_or(0);
    let items =
        content_db_operations::list_content(&conn, kind, query.locale, true, limit, offset)?;
    Ok(HttpResponse::Ok().json(items))
}

async fn get_content(
    pool: web::Data<DbPool>,
    kind: ContentKind,
    slug: &str,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let locale = query.locale.unwrap_or(Locale::Tr);
    let record = content_db_operations::read_content_by_slug(&conn, kind, locale, slug, true)?
        .ok_or(ApiError::NotFound(kind.entity_name()))?;

    let translation_path =
        content_db_operations::read_translation_counterpart(&conn, kind, &record, true)?
            .map(|sibling| locale_helpers::content_path(kind, sibling.locale, &sibling.slug));

    let reading_time_minutes = match kind {
        ContentKind::Article => Some(reading_time_helpers::estimate_from_body(&record.body)),
        _ => None,
    };

    Ok(HttpResponse::Ok().json(ContentDetail {
        record,
        reading_time_minutes,
        translation_path,
    }))
}

async fn list_news(
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    list_content(pool, ContentKind::News, query).await
}

async fn get_news(
    pool: web::Data<DbPool>,
    slug: web::Path<String>,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse, ApiError> {
    get_content(pool, ContentKind::News, &slug, query).await
}

async fn list_articles(
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    list_content(pool, ContentKind::Article, query).await
}

async fn get_article(
    pool: web::Data<DbPool>,
    slug: web::Path<String>,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse, ApiError> {
    get_content(pool, ContentKind::Article, &slug, query).await
}

async fn list_projects(
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    list_content(pool, ContentKind::Project, query).await
}

async fn get_project(
    pool: web::Data<DbPool>,
    slug: web::Path<String>,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse, ApiError> {
    get_content(pool, ContentKind::Project, &slug, query).await
}

async fn list_services(
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    list_content(pool, ContentKind::Service, query).await
}

async fn get_service(
    pool: web::Data<DbPool>,
    slug: web::Path<String>,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse, ApiError> {
    get_content(pool, ContentKind::Service, &slug, query).await
}

async fn list_notices(
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    list_content(pool, ContentKind::Notice, query).await
}

async fn get_notice(
    pool: web::Data<DbPool>,
    slug: web::Path<String>,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse, ApiError> {
    get_content(pool, ContentKind::Notice, &slug, query).await
}

// --- Popups, members, sponsors, galleries ---

async fn get_active_popups(
    pool: web::Data<DbPool>,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let locale = query.locale.unwrap_or(Locale::Tr);
    let now = Utc::now().to_rfc3339();
    let popups = site_db_operations::list_active_popups(&conn, locale, &now)?;
    Ok(HttpResponse::Ok().json(popups))
}

async fn list_members(
    pool: web::Data<DbPool>,
    kind: MemberKind,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let members =
        site_db_operations::list_members(&conn, kind, Some(query.locale.unwrap_or(Locale::Tr)))?;
    Ok(HttpResponse::Ok().json(members))
}

async fn list_board_members(
    pool: web::Data<DbPool>,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse, ApiError> {
    list_members(pool, MemberKind::Board, query).await
}

async fn list_audit_board_members(
    pool: web::Data<DbPool>,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse, ApiError> {
    list_members(pool, MemberKind::AuditBoard, query).await
}

async fn list_sponsors(
    pool: web::Data<DbPool>,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let sponsors =
        site_db_operations::list_sponsors(&conn, Some(query.locale.unwrap_or(Locale::Tr)))?;
    Ok(HttpResponse::Ok().json(sponsors))
}

async fn list_gallery(
    pool: web::Data<DbPool>,
    kind: GalleryKind,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let limit = query.limit.unwrap_or(24).min(100);
    let offset = query.offset.unwrap_or(0);
    let items = site_db_operations::list_gallery_items(
        &conn,
        kind,
        Some(query.locale.unwrap_or(Locale::Tr)),
        limit,
        offset,
    )?;
    Ok(HttpResponse::Ok().json(items))
}

async fn list_photo_gallery(
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    list_gallery(pool, GalleryKind::Photo, query).await
}

async fn list_video_gallery(
    pool: web::Data<DbPool>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse, ApiError> {
    list_gallery(pool, GalleryKind::Video, query).await
}

// --- Singletons ---

async fn get_contact_info(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let info = site_db_operations::read_contact_info(&conn)?
        .ok_or(ApiError::NotFound("Contact info"))?;
    Ok(HttpResponse::Ok().json(info))
}

async fn get_officer(
    pool: web::Data<DbPool>,
    kind: OfficerKind,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let profile =
        site_db_operations::read_officer(&conn, kind, query.locale.unwrap_or(Locale::Tr))?
            .ok_or(ApiError::NotFound(kind.entity_name()))?;
    Ok(HttpResponse::Ok().json(profile))
}

async fn get_president(
    pool: web::Data<DbPool>,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse, ApiError> {
    get_officer(pool, OfficerKind::President, query).await
}

async fn get_representative(
    pool: web::Data<DbPool>,
    query: web::Query<LocaleQuery>,
) -> Result<HttpResponse, ApiError> {
    get_officer(pool, OfficerKind::Representative, query).await
}
