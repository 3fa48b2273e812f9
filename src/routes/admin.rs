use crate::config::Config;
use crate::error::ApiError;
use crate::helper::{rate_limit_helpers, text_helpers, upload_helpers, validation_helpers};
use crate::middleware::{admin_guard, ip_guard, AuthenticatedAdmin};
use crate::models::db_operations::{
    content_db_operations, site_db_operations, users_db_operations,
};
use crate::models::{
    ContactInfo, ContentKind, GalleryKind, Locale, MemberKind, OfficerKind, OfficerProfile,
};
use crate::{AppState, DbPool};
use actix_multipart::Multipart;
use actix_session::{Session, SessionExt};
use actix_web::{guard, web, HttpRequest, HttpResponse};
use rusqlite::Connection;
use serde::Deserialize;
use serde_json::json;

/// Everything under `/management/{prefix}`. Login and logout sit behind the
/// IP allow-list guard; the CRUD scope additionally requires an admin
/// session cookie. A request that fails the session guard falls through to
/// the trailing `/api` scope and gets a 401 instead of a 404.
pub fn config_admin(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .guard(guard::fn_guard(ip_guard))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .service(
                web::scope("/api")
                    .guard(guard::fn_guard(|ctx| admin_guard(&ctx.get_session())))
                    .route("/session", web::get().to(session_info))
                    .route("/upload", web::post().to(upload_file))
                    .route("/settings", web::get().to(get_settings))
                    .route("/settings", web::put().to(update_settings))
                    .route("/contact_info", web::put().to(put_contact_info))
                    .route("/president", web::put().to(put_president))
                    .route("/representative", web::put().to(put_representative))
                    .configure(content_routes)
                    .configure(site_routes),
            )
            .service(web::scope("/api").default_service(web::to(api_not_logged_in))),
    );
}

async fn api_not_logged_in() -> Result<HttpResponse, ApiError> {
    Err(ApiError::Unauthorized("Not logged in."))
}

fn content_routes(cfg: &mut web::ServiceConfig) {
    for kind in ContentKind::ALL {
        cfg.service(
            web::scope(&format!("/{}", kind.table()))
                .route(
                    "",
                    web::get().to(move |p: web::Data<DbPool>, q: web::Query<AdminListQuery>| {
                        list_content(p, kind, q)
                    }),
                )
                .route(
                    "",
                    web::post().to(move |p: web::Data<DbPool>, b: web::Json<ContentPayload>| {
                        create_content(p, kind, b)
                    }),
                )
                .route(
                    "/{id}",
                    web::get().to(move |p: web::Data<DbPool>, id: web::Path<i64>| {
                        read_content(p, kind, id)
                    }),
                )
                .route(
                    "/{id}",
                    web::put().to(
                        move |p: web::Data<DbPool>,
                              id: web::Path<i64>,
                              b: web::Json<ContentPayload>| {
                            update_content(p, kind, id, b)
                        },
                    ),
                )
                .route(
                    "/{id}",
                    web::delete().to(move |p: web::Data<DbPool>, id: web::Path<i64>| {
                        delete_content(p, kind, id)
                    }),
                ),
        );
    }
}

fn site_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/popups")
            .route("", web::get().to(list_popups))
            .route("", web::post().to(create_popup))
            .route("/{id}", web::get().to(read_popup))
            .route("/{id}", web::put().to(update_popup))
            .route("/{id}", web::delete().to(delete_popup)),
    );
    for kind in [MemberKind::Board, MemberKind::AuditBoard] {
        cfg.service(
            web::scope(&format!("/{}", kind.table()))
                .route(
                    "",
                    web::get().to(move |p: web::Data<DbPool>, q: web::Query<AdminListQuery>| {
                        list_members(p, kind, q)
                    }),
                )
                .route(
                    "",
                    web::post().to(move |p: web::Data<DbPool>, b: web::Json<MemberPayload>| {
                        create_member(p, kind, b)
                    }),
                )
                .route(
                    "/{id}",
                    web::get().to(move |p: web::Data<DbPool>, id: web::Path<i64>| {
                        read_member(p, kind, id)
                    }),
                )
                .route(
                    "/{id}",
                    web::put().to(
                        move |p: web::Data<DbPool>,
                              id: web::Path<i64>,
                              b: web::Json<MemberPayload>| {
                            update_member(p, kind, id, b)
                        },
                    ),
                )
                .route(
                    "/{id}",
                    web::delete().to(move |p: web::Data<DbPool>, id: web::Path<i64>| {
                        delete_member(p, kind, id)
                    }),
                ),
        );
    }
    cfg.service(
        web::scope("/sponsors")
            .route("", web::get().to(list_sponsors))
            .route("", web::post().to(create_sponsor))
            .route("/{id}", web::get().to(read_sponsor))
            .route("/{id}", web::put().to(update_sponsor))
            .route("/{id}", web::delete().to(delete_sponsor)),
    );
    for kind in [GalleryKind::Photo, GalleryKind::Video] {
        cfg.service(
            web::scope(&format!("/{}", kind.table()))
                .route(
                    "",
                    web::get().to(move |p: web::Data<DbPool>, q: web::Query<AdminListQuery>| {
                        list_gallery(p, kind, q)
                    }),
                )
                .route(
                    "",
                    web::post().to(move |p: web::Data<DbPool>, b: web::Json<GalleryPayload>| {
                        create_gallery(p, kind, b)
                    }),
                )
                .route(
                    "/{id}",
                    web::get().to(move |p: web::Data<DbPool>, id: web::Path<i64>| {
                        read_gallery(p, kind, id)
                    }),
                )
                .route(
                    "/{id}",
                    web::put().to(
                        move |p: web::Data<DbPool>,
                              id: web::Path<i64>,
                              b: web::Json<GalleryPayload>| {
                            update_gallery(p, kind, id, b)
                        },
                    ),
                )
                .route(
                    "/{id}",
                    web::delete().to(move |p: web::Data<DbPool>, id: web::Path<i64>| {
                        delete_gallery(p, kind, id)
                    }),
                ),
        );
    }
}

// --- Auth ---

#[derive(Deserialize)]
pub struct LoginPayload {
    username: String,
    password: String,
}

async fn login(
    pool: web::Data<DbPool>,
    session: Session,
    payload: web::Json<LoginPayload>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let username =
        users_db_operations::verify_credentials(&conn, &payload.username, &payload.password)
            .ok_or(ApiError::Unauthorized(
                "Invalid credentials or account suspended.",
            ))?;

    session.renew();
    session
        .insert("username", &username)
        .map_err(|e| ApiError::Internal(format!("Session error: {}", e)))?;
    session
        .insert("role", "admin")
        .map_err(|e| ApiError::Internal(format!("Session error: {}", e)))?;
    users_db_operations::update_last_login_time(&conn, &username)?;

    log::info!("Admin '{}' logged in.", username);
    Ok(HttpResponse::Ok().json(json!({ "success": true, "username": username })))
}

async fn logout(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::Ok().json(json!({ "success": true }))
}

async fn session_info(admin: AuthenticatedAdmin) -> HttpResponse {
    HttpResponse::Ok().json(admin)
}

// --- Slugged content ---

#[derive(Deserialize)]
pub struct AdminListQuery {
    locale: Option<Locale>,
    limit: Option<u32>,
    offset: Option<u32>,
}

#[derive(Deserialize)]
pub struct ContentPayload {
    locale: Locale,
    title: String,
    slug: Option<String>,
    #[serde(default)]
    summary: String,
    body: String,
    cover_image: Option<String>,
    priority: Option<String>,
    published_at: Option<String>,
    #[serde(default = "default_true")]
    is_active: bool,
    parent_id: Option<i64>,
}

fn default_true() -> bool {
    true
}

impl ContentPayload {
    /// Full field validation plus slug resolution. Timestamps are rewritten
    /// to UTC in place. An explicit slug is slugified and must be free;
    /// otherwise one is derived from the title with suffix dedup.
    fn validate(
        &mut self,
        conn: &Connection,
        kind: ContentKind,
        exclude_id: Option<i64>,
    ) -> Result<String, ApiError> {
        validation_helpers::validate_title("title", &self.title)?;
        validation_helpers::validate_body_json(&self.body)?;
        if let Some(cover) = &self.cover_image {
            validation_helpers::validate_url_field("cover_image", cover)?;
        }
        match &self.priority {
            Some(priority) if kind == ContentKind::Notice => {
                validation_helpers::validate_priority(priority)?;
            }
            Some(_) => {
                return Err(ApiError::Validation(
                    "priority is only accepted for notices".to_string(),
                ));
            }
            None => {}
        }
        if let Some(published_at) = self.published_at.take() {
            self.published_at = Some(validation_helpers::normalize_timestamp(
                "published_at",
                &published_at,
            )?);
        }
        if let Some(parent_id) = self.parent_id {
            validation_helpers::validate_parent_pairing(
                conn,
                kind.table(),
                parent_id,
                self.locale,
            )?;
        }

        match &self.slug {
            Some(explicit) => {
                let slug = text_helpers::slugify(explicit);
                if slug.is_empty() {
                    return Err(ApiError::Validation(
                        "slug must contain at least one letter or digit".to_string(),
                    ));
                }
                if content_db_operations::slug_exists(conn, kind, self.locale, &slug, exclude_id)? {
                    return Err(ApiError::Validation(format!(
                        "slug '{}' is already in use for this locale",
                        slug
                    )));
                }
                Ok(slug)
            }
            None => Ok(text_helpers::unique_slug(
                conn,
                kind,
                self.locale,
                &self.title,
                exclude_id,
            )?),
        }
    }

    fn as_input<'a>(&'a self, slug: &'a str) -> content_db_operations::ContentInput<'a> {
        content_db_operations::ContentInput {
            locale: self.locale,
            title: &self.title,
            slug,
            summary: &self.summary,
            body: &self.body,
            cover_image: self.cover_image.as_deref(),
            priority: self.priority.as_deref(),
            published_at: self.published_at.as_deref(),
            is_active: self.is_active,
            parent_id: self.parent_id,
        }
    }
}

async fn list_content(
    pool: web::Data<DbPool>,
    kind: ContentKind,
    query: web::Query<AdminListQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let limit = query.limit.unwrap_or(50).min(200);
    let offset = query.offset.unwrap_or(0);
    // Admin listings include inactive rows.
    let items =
        content_db_operations::list_content(&conn, kind, query.locale, false, limit, offset)?;
    Ok(HttpResponse::Ok().json(items))
}

async fn read_content(
    pool: web::Data<DbPool>,
    kind: ContentKind,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let record = content_db_operations::read_content(&conn, kind, *id)?
        .ok_or(ApiError::NotFound(kind.entity_name()))?;
    Ok(HttpResponse::Ok().json(record))
}

async fn create_content(
    pool: web::Data<DbPool>,
    kind: ContentKind,
    payload: web::Json<ContentPayload>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let mut payload = payload.into_inner();
    let slug = payload.validate(&conn, kind, None)?;
    let id = content_db_operations::create_content(&conn, kind, &payload.as_input(&slug))?;
    let record = content_db_operations::read_content(&conn, kind, id)?
        .ok_or(ApiError::NotFound(kind.entity_name()))?;
    Ok(HttpResponse::Created().json(record))
}

async fn update_content(
    pool: web::Data<DbPool>,
    kind: ContentKind,
    id: web::Path<i64>,
    payload: web::Json<ContentPayload>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    if content_db_operations::read_content(&conn, kind, *id)?.is_none() {
        return Err(ApiError::NotFound(kind.entity_name()));
    }
    let mut payload = payload.into_inner();
    let slug = payload.validate(&conn, kind, Some(*id))?;
    content_db_operations::update_content(&conn, kind, *id, &payload.as_input(&slug))?;
    let record = content_db_operations::read_content(&conn, kind, *id)?
        .ok_or(ApiError::NotFound(kind.entity_name()))?;
    Ok(HttpResponse::Ok().json(record))
}

async fn delete_content(
    pool: web::Data<DbPool>,
    kind: ContentKind,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let deleted = content_db_operations::delete_content(&conn, kind, *id)?;
    if deleted == 0 {
        return Err(ApiError::NotFound(kind.entity_name()));
    }
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

// --- Popups ---

#[derive(Deserialize)]
pub struct PopupPayload {
    locale: Locale,
    title: String,
    image_url: Option<String>,
    link_url: Option<String>,
    frequency: String,
    starts_at: Option<String>,
    ends_at: Option<String>,
    #[serde(default = "default_true")]
    is_active: bool,
    parent_id: Option<i64>,
}

impl PopupPayload {
    fn validate(&mut self, conn: &Connection) -> Result<(), ApiError> {
        validation_helpers::validate_title("title", &self.title)?;
        validation_helpers::validate_frequency(&self.frequency)?;
        if let Some(image_url) = &self.image_url {
            validation_helpers::validate_url_field("image_url", image_url)?;
        }
        if let Some(link_url) = &self.link_url {
            validation_helpers::validate_url_field("link_url", link_url)?;
        }
        if let Some(starts_at) = self.starts_at.take() {
            self.starts_at =
                Some(validation_helpers::normalize_timestamp("starts_at", &starts_at)?);
        }
        if let Some(ends_at) = self.ends_at.take() {
            self.ends_at = Some(validation_helpers::normalize_timestamp("ends_at", &ends_at)?);
        }
        // Both ends of the window are UTC-normalized above, so the text
        // comparison is chronological.
        if let (Some(starts_at), Some(ends_at)) = (&self.starts_at, &self.ends_at) {
            if starts_at > ends_at {
                return Err(ApiError::Validation(
                    "starts_at must not be after ends_at".to_string(),
                ));
            }
        }
        if let Some(parent_id) = self.parent_id {
            validation_helpers::validate_parent_pairing(conn, "popups", parent_id, self.locale)?;
        }
        Ok(())
    }

    fn as_input(&self) -> site_db_operations::PopupInput {
        site_db_operations::PopupInput {
            locale: self.locale,
            title: &self.title,
            image_url: self.image_url.as_deref(),
            link_url: self.link_url.as_deref(),
            frequency: &self.frequency,
            starts_at: self.starts_at.as_deref(),
            ends_at: self.ends_at.as_deref(),
            is_active: self.is_active,
            parent_id: self.parent_id,
        }
    }
}

async fn list_popups(
    pool: web::Data<DbPool>,
    query: web::Query<AdminListQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let popups = site_db_operations::list_popups(&conn, query.locale)?;
    Ok(HttpResponse::Ok().json(popups))
}

async fn read_popup(
    pool: web::Data<DbPool>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let popup =
        site_db_operations::read_popup(&conn, *id)?.ok_or(ApiError::NotFound("Popup"))?;
    Ok(HttpResponse::Ok().json(popup))
}

async fn create_popup(
    pool: web::Data<DbPool>,
    payload: web::Json<PopupPayload>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let mut payload = payload.into_inner();
    payload.validate(&conn)?;
    let id = site_db_operations::create_popup(&conn, &payload.as_input())?;
    let popup =
        site_db_operations::read_popup(&conn, id)?.ok_or(ApiError::NotFound("Popup"))?;
    Ok(HttpResponse::Created().json(popup))
}

async fn update_popup(
    pool: web::Data<DbPool>,
    id: web::Path<i64>,
    payload: web::Json<PopupPayload>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let mut payload = payload.into_inner();
    payload.validate(&conn)?;
    if site_db_operations::update_popup(&conn, *id, &payload.as_input())? == 0 {
        return Err(ApiError::NotFound("Popup"));
    }
    let popup =
        site_db_operations::read_popup(&conn, *id)?.ok_or(ApiError::NotFound("Popup"))?;
    Ok(HttpResponse::Ok().json(popup))
}

async fn delete_popup(
    pool: web::Data<DbPool>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    if site_db_operations::delete_popup(&conn, *id)? == 0 {
        return Err(ApiError::NotFound("Popup"));
    }
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

// --- Board / audit-board members ---

#[derive(Deserialize)]
pub struct MemberPayload {
    locale: Locale,
    full_name: String,
    role_title: String,
    photo_url: Option<String>,
    #[serde(default)]
    display_order: i64,
    parent_id: Option<i64>,
}

impl MemberPayload {
    fn validate(&self, conn: &Connection, kind: MemberKind) -> Result<(), ApiError> {
        validation_helpers::validate_title("full_name", &self.full_name)?;
        validation_helpers::validate_title("role_title", &self.role_title)?;
        if let Some(photo_url) = &self.photo_url {
            validation_helpers::validate_url_field("photo_url", photo_url)?;
        }
        if let Some(parent_id) = self.parent_id {
            validation_helpers::validate_parent_pairing(
                conn,
                kind.table(),
                parent_id,
                self.locale,
            )?;
        }
        Ok(())
    }

    fn as_input(&self) -> site_db_operations::MemberInput {
        site_db_operations::MemberInput {
            locale: self.locale,
            full_name: &self.full_name,
            role_title: &self.role_title,
            photo_url: self.photo_url.as_deref(),
            display_order: self.display_order,
            parent_id: self.parent_id,
        }
    }
}

async fn list_members(
    pool: web::Data<DbPool>,
    kind: MemberKind,
    query: web::Query<AdminListQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let members = site_db_operations::list_members(&conn, kind, query.locale)?;
    Ok(HttpResponse::Ok().json(members))
}

async fn read_member(
    pool: web::Data<DbPool>,
    kind: MemberKind,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let member = site_db_operations::read_member(&conn, kind, *id)?
        .ok_or(ApiError::NotFound(kind.entity_name()))?;
    Ok(HttpResponse::Ok().json(member))
}

async fn create_member(
    pool: web::Data<DbPool>,
    kind: MemberKind,
    payload: web::Json<MemberPayload>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    payload.validate(&conn, kind)?;
    let id = site_db_operations::create_member(&conn, kind, &payload.as_input())?;
    let member = site_db_operations::read_member(&conn, kind, id)?
        .ok_or(ApiError::NotFound(kind.entity_name()))?;
    Ok(HttpResponse::Created().json(member))
}

async fn update_member(
    pool: web::Data<DbPool>,
    kind: MemberKind,
    id: web::Path<i64>,
    payload: web::Json<MemberPayload>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    payload.validate(&conn, kind)?;
    if site_db_operations::update_member(&conn, kind, *id, &payload.as_input())? == 0 {
        return Err(ApiError::NotFound(kind.entity_name()));
    }
    let member = site_db_operations::read_member(&conn, kind, *id)?
        .ok_or(ApiError::NotFound(kind.entity_name()))?;
    Ok(HttpResponse::Ok().json(member))
}

async fn delete_member(
    pool: web::Data<DbPool>,
    kind: MemberKind,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    if site_db_operations::delete_member(&conn, kind, *id)? == 0 {
        return Err(ApiError::NotFound(kind.entity_name()));
    }
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

// --- Sponsors ---

#[derive(Deserialize)]
pub struct SponsorPayload {
    locale: Locale,
    name: String,
    logo_url: Option<String>,
    website_url: Option<String>,
    #[serde(default)]
    display_order: i64,
    parent_id: Option<i64>,
}

impl SponsorPayload {
    fn validate(&self, conn: &Connection) -> Result<(), ApiError> {
        validation_helpers::validate_title("name", &self.name)?;
        if let Some(logo_url) = &self.logo_url {
            validation_helpers::validate_url_field("logo_url", logo_url)?;
        }
        if let Some(website_url) = &self.website_url {
            validation_helpers::validate_url_field("website_url", website_url)?;
        }
        if let Some(parent_id) = self.parent_id {
            validation_helpers::validate_parent_pairing(conn, "sponsors", parent_id, self.locale)?;
        }
        Ok(())
    }

    fn as_input(&self) -> site_db_operations::SponsorInput {
        site_db_operations::SponsorInput {
            locale: self.locale,
            name: &self.name,
            logo_url: self.logo_url.as_deref(),
            website_url: self.website_url.as_deref(),
            display_order: self.display_order,
            parent_id: self.parent_id,
        }
    }
}

async fn list_sponsors(
    pool: web::Data<DbPool>,
    query: web::Query<AdminListQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let sponsors = site_db_operations::list_sponsors(&conn, query.locale)?;
    Ok(HttpResponse::Ok().json(sponsors))
}

async fn read_sponsor(
    pool: web::Data<DbPool>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let sponsor =
        site_db_operations::read_sponsor(&conn, *id)?.ok_or(ApiError::NotFound("Sponsor"))?;
    Ok(HttpResponse::Ok().json(sponsor))
}

async fn create_sponsor(
    pool: web::Data<DbPool>,
    payload: web::Json<SponsorPayload>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    payload.validate(&conn)?;
    let id = site_db_operations::create_sponsor(&conn, &payload.as_input())?;
    let sponsor =
        site_db_operations::read_sponsor(&conn, id)?.ok_or(ApiError::NotFound("Sponsor"))?;
    Ok(HttpResponse::Created().json(sponsor))
}

async fn update_sponsor(
    pool: web::Data<DbPool>,
    id: web::Path<i64>,
    payload: web::Json<SponsorPayload>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    payload.validate(&conn)?;
    if site_db_operations::update_sponsor(&conn, *id, &payload.as_input())? == 0 {
        return Err(ApiError::NotFound("Sponsor"));
    }
    let sponsor =
        site_db_operations::read_sponsor(&conn, *id)?.ok_or(ApiError::NotFound("Sponsor"))?;
    Ok(HttpResponse::Ok().json(sponsor))
}

async fn delete_sponsor(
    pool: web::Data<DbPool>,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    if site_db_operations::delete_sponsor(&conn, *id)? == 0 {
        return Err(ApiError::NotFound("Sponsor"));
    }
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

// --- Galleries ---

#[derive(Deserialize)]
pub struct GalleryPayload {
    locale: Locale,
    title: String,
    media_url: String,
    #[serde(default)]
    display_order: i64,
    parent_id: Option<i64>,
}

impl GalleryPayload {
    fn validate(&self, conn: &Connection, kind: GalleryKind) -> Result<(), ApiError> {
        validation_helpers::validate_title("title", &self.title)?;
        validation_helpers::validate_url_field("media_url", &self.media_url)?;
        if let Some(parent_id) = self.parent_id {
            validation_helpers::validate_parent_pairing(
                conn,
                kind.table(),
                parent_id,
                self.locale,
            )?;
        }
        Ok(())
    }

    fn as_input(&self) -> site_db_operations::GalleryInput {
        site_db_operations::GalleryInput {
            locale: self.locale,
            title: &self.title,
            media_url: &self.media_url,
            display_order: self.display_order,
            parent_id: self.parent_id,
        }
    }
}

async fn list_gallery(
    pool: web::Data<DbPool>,
    kind: GalleryKind,
    query: web::Query<AdminListQuery>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let limit = query.limit.unwrap_or(50).min(200);
    let offset = query.offset.unwrap_or(0);
    let items =
        site_db_operations::list_gallery_items(&conn, kind, query.locale, limit, offset)?;
    Ok(HttpResponse::Ok().json(items))
}

async fn read_gallery(
    pool: web::Data<DbPool>,
    kind: GalleryKind,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let item = site_db_operations::read_gallery_item(&conn, kind, *id)?
        .ok_or(ApiError::NotFound(kind.entity_name()))?;
    Ok(HttpResponse::Ok().json(item))
}

async fn create_gallery(
    pool: web::Data<DbPool>,
    kind: GalleryKind,
    payload: web::Json<GalleryPayload>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    payload.validate(&conn, kind)?;
    let id = site_db_operations::create_gallery_item(&conn, kind, &payload.as_input())?;
    let item = site_db_operations::read_gallery_item(&conn, kind, id)?
        .ok_or(ApiError::NotFound(kind.entity_name()))?;
    Ok(HttpResponse::Created().json(item))
}

async fn update_gallery(
    pool: web::Data<DbPool>,
    kind: GalleryKind,
    id: web::Path<i64>,
    payload: web::Json<GalleryPayload>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    payload.validate(&conn, kind)?;
    if site_db_operations::update_gallery_item(&conn, kind, *id, &payload.as_input())? == 0 {
        return Err(ApiError::NotFound(kind.entity_name()));
    }
    let item = site_db_operations::read_gallery_item(&conn, kind, *id)?
        .ok_or(ApiError::NotFound(kind.entity_name()))?;
    Ok(HttpResponse::Ok().json(item))
}

async fn delete_gallery(
    pool: web::Data<DbPool>,
    kind: GalleryKind,
    id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    if site_db_operations::delete_gallery_item(&conn, kind, *id)? == 0 {
        return Err(ApiError::NotFound(kind.entity_name()));
    }
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

// --- Singletons ---

#[derive(Deserialize)]
pub struct ContactPayload {
    address: String,
    phone: String,
    email: String,
    map_embed_url: Option<String>,
}

async fn put_contact_info(
    pool: web::Data<DbPool>,
    payload: web::Json<ContactPayload>,
) -> Result<HttpResponse, ApiError> {
    validation_helpers::validate_title("address", &payload.address)?;
    validation_helpers::validate_title("phone", &payload.phone)?;
    validation_helpers::validate_title("email", &payload.email)?;
    if let Some(map_embed_url) = &payload.map_embed_url {
        validation_helpers::validate_url_field("map_embed_url", map_embed_url)?;
    }

    let conn = pool.get()?;
    let info = ContactInfo {
        address: payload.address.clone(),
        phone: payload.phone.clone(),
        email: payload.email.clone(),
        map_embed_url: payload.map_embed_url.clone(),
        updated_at: None,
    };
    site_db_operations::upsert_contact_info(&conn, &info)?;
    let stored = site_db_operations::read_contact_info(&conn)?
        .ok_or(ApiError::NotFound("Contact info"))?;
    Ok(HttpResponse::Ok().json(stored))
}

#[derive(Deserialize)]
pub struct OfficerPayload {
    locale: Locale,
    full_name: String,
    title: String,
    photo_url: Option<String>,
    message: String,
}

async fn put_officer(
    pool: web::Data<DbPool>,
    kind: OfficerKind,
    payload: web::Json<OfficerPayload>,
) -> Result<HttpResponse, ApiError> {
    validation_helpers::validate_title("full_name", &payload.full_name)?;
    validation_helpers::validate_title("title", &payload.title)?;
    if let Some(photo_url) = &payload.photo_url {
        validation_helpers::validate_url_field("photo_url", photo_url)?;
    }
    if payload.message.trim().is_empty() {
        return Err(ApiError::Validation("message must not be empty".to_string()));
    }

    let conn = pool.get()?;
    let profile = OfficerProfile {
        locale: payload.locale,
        full_name: payload.full_name.clone(),
        title: payload.title.clone(),
        photo_url: payload.photo_url.clone(),
        message: payload.message.clone(),
        updated_at: None,
    };
    site_db_operations::upsert_officer(&conn, kind, &profile)?;
    let stored = site_db_operations::read_officer(&conn, kind, payload.locale)?
        .ok_or(ApiError::NotFound(kind.entity_name()))?;
    Ok(HttpResponse::Ok().json(stored))
}

async fn put_president(
    pool: web::Data<DbPool>,
    payload: web::Json<OfficerPayload>,
) -> Result<HttpResponse, ApiError> {
    put_officer(pool, OfficerKind::President, payload).await
}

async fn put_representative(
    pool: web::Data<DbPool>,
    payload: web::Json<OfficerPayload>,
) -> Result<HttpResponse, ApiError> {
    put_officer(pool, OfficerKind::Representative, payload).await
}

// --- Upload settings ---

#[derive(Deserialize)]
pub struct SettingsPayload {
    max_file_upload_size_mb: Option<u64>,
    allowed_mime_types: Option<String>,
    upload_rate_limit_per_minute: Option<usize>,
}

async fn get_settings(pool: web::Data<DbPool>) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    let policy = upload_helpers::UploadPolicy::from_settings(&conn);
    let mut mime_types: Vec<&String> = policy.allowed_mime_types.iter().collect();
    mime_types.sort();
    Ok(HttpResponse::Ok().json(json!({
        "max_file_upload_size_mb": policy.max_file_size_mb,
        "allowed_mime_types": mime_types,
        "upload_rate_limit_per_minute": policy.rate_limit_per_minute,
    })))
}

async fn update_settings(
    pool: web::Data<DbPool>,
    payload: web::Json<SettingsPayload>,
) -> Result<HttpResponse, ApiError> {
    let conn = pool.get()?;
    if let Some(size) = payload.max_file_upload_size_mb {
        if size == 0 || size > 1024 {
            return Err(ApiError::Validation(
                "max_file_upload_size_mb must be between 1 and 1024".to_string(),
            ));
        }
        users_db_operations::update_setting(&conn, "max_file_upload_size_mb", &size.to_string())?;
    }
    if let Some(types) = &payload.allowed_mime_types {
        for mime in types.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if upload_helpers::mime_to_safe_extension(mime).is_none() {
                return Err(ApiError::Validation(format!(
                    "MIME type '{}' has no safe extension mapping and cannot be allowed",
                    mime
                )));
            }
        }
        users_db_operations::update_setting(&conn, "allowed_mime_types", types)?;
    }
    if let Some(rate) = payload.upload_rate_limit_per_minute {
        if rate == 0 {
            return Err(ApiError::Validation(
                "upload_rate_limit_per_minute must be at least 1".to_string(),
            ));
        }
        users_db_operations::update_setting(
            &conn,
            "upload_rate_limit_per_minute",
            &rate.to_string(),
        )?;
    }
    get_settings(pool).await
}

// --- Uploads ---

fn client_ip(req: &HttpRequest) -> String {
    req.headers()
        .get("X-Forwarded-For")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

async fn upload_file(
    req: HttpRequest,
    pool: web::Data<DbPool>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let policy = {
        let conn = pool.get()?;
        upload_helpers::UploadPolicy::from_settings(&conn)
    };

    let ip = client_ip(&req);
    if !rate_limit_helpers::allow_upload(&state, &ip, policy.rate_limit_per_minute) {
        log::warn!("Upload rate limit hit for {}", ip);
        return Err(ApiError::RateLimited);
    }

    let media_root = std::path::PathBuf::from(&config.media_path);
    let saved = upload_helpers::save_upload(&media_root, &policy, payload).await?;
    log::info!("Stored upload {} as {}", saved.id, saved.url);
    Ok(HttpResponse::Ok().json(json!({ "success": true, "id": saved.id, "url": saved.url })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use r2d2::Pool;
    use r2d2_sqlite::SqliteConnectionManager;

    #[actix_web::test]
    async fn admin_api_without_session_is_unauthorized() {
        std::env::set_var("ADMIN_LOGIN_ACCEPT_IP", "*");
        let pool = Pool::builder()
            .max_size(1)
            .build(SqliteConnectionManager::memory())
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pool))
                .configure(config_admin),
        )
        .await;

        for uri in ["/api/news", "/api/popups/5", "/api/settings"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        }
    }
}
