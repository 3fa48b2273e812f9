use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two locales the site is published in. Turkish is the site default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Tr,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Tr => "tr",
            Locale::En => "en",
        }
    }

    /// The translation counterpart locale.
    pub fn other(&self) -> Locale {
        match self {
            Locale::Tr => Locale::En,
            Locale::En => Locale::Tr,
        }
    }
}

impl FromStr for Locale {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tr" => Ok(Locale::Tr),
            "en" => Ok(Locale::En),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five slugged content families. They share one row shape and one CRUD
/// path; the enum picks the backing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    News,
    Article,
    Project,
    Service,
    Notice,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::News,
        ContentKind::Article,
        ContentKind::Project,
        ContentKind::Service,
        ContentKind::Notice,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            ContentKind::News => "news",
            ContentKind::Article => "articles",
            ContentKind::Project => "projects",
            ContentKind::Service => "services",
            ContentKind::Notice => "notices",
        }
    }

    pub fn entity_name(&self) -> &'static str {
        match self {
            ContentKind::News => "News",
            ContentKind::Article => "Article",
            ContentKind::Project => "Project",
            ContentKind::Service => "Service",
            ContentKind::Notice => "Notice",
        }
    }

    /// URL segment used by the public site for this family, per locale.
    /// Mirrors the path layout of the rendered pages.
    pub fn public_segment(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (ContentKind::News, Locale::Tr) => "haberler",
            (ContentKind::News, Locale::En) => "news",
            (ContentKind::Article, Locale::Tr) => "makaleler",
            (ContentKind::Article, Locale::En) => "articles",
            (ContentKind::Project, Locale::Tr) => "projeler",
            (ContentKind::Project, Locale::En) => "projects",
            (ContentKind::Service, Locale::Tr) => "hizmetler",
            (ContentKind::Service, Locale::En) => "services",
            (ContentKind::Notice, Locale::Tr) => "duyurular",
            (ContentKind::Notice, Locale::En) => "notices",
        }
    }
}

/// Board vs audit-board members share a shape; the enum picks the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Board,
    AuditBoard,
}

impl MemberKind {
    pub fn table(&self) -> &'static str {
        match self {
            MemberKind::Board => "board_members",
            MemberKind::AuditBoard => "audit_board_members",
        }
    }

    pub fn entity_name(&self) -> &'static str {
        match self {
            MemberKind::Board => "Board member",
            MemberKind::AuditBoard => "Audit board member",
        }
    }
}

/// Photo vs video gallery items, same idea.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GalleryKind {
    Photo,
    Video,
}

impl GalleryKind {
    pub fn table(&self) -> &'static str {
        match self {
            GalleryKind::Photo => "photo_gallery",
            GalleryKind::Video => "video_gallery",
        }
    }

    pub fn entity_name(&self) -> &'static str {
        match self {
            GalleryKind::Photo => "Photo gallery item",
            GalleryKind::Video => "Video gallery item",
        }
    }
}

/// President and representative are per-locale singletons in one shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfficerKind {
    President,
    Representative,
}

impl OfficerKind {
    pub fn table(&self) -> &'static str {
        match self {
            OfficerKind::President => "presidents",
            OfficerKind::Representative => "representatives",
        }
    }

    pub fn entity_name(&self) -> &'static str {
        match self {
            OfficerKind::President => "President",
            OfficerKind::Representative => "Representative",
        }
    }
}

/// A full slugged-content row (news, article, project, service, notice).
/// `body` holds the rich-text block tree as JSON text; `priority` is only
/// populated for notices. Timestamps are RFC3339 strings, as stored.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContentRecord {
    pub id: i64,
    pub locale: Locale,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub body: String,
    pub cover_image: Option<String>,
    pub priority: Option<String>,
    pub published_at: Option<String>,
    pub is_active: bool,
    pub parent_id: Option<i64>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// List-endpoint projection of a content row (no body).
#[derive(Debug, Serialize, Clone)]
pub struct ContentSummary {
    pub id: i64,
    pub locale: Locale,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub cover_image: Option<String>,
    pub priority: Option<String>,
    pub published_at: Option<String>,
    pub is_active: bool,
    pub parent_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Popup {
    pub id: i64,
    pub locale: Locale,
    pub title: String,
    pub image_url: Option<String>,
    pub link_url: Option<String>,
    pub frequency: String,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
    pub is_active: bool,
    pub parent_id: Option<i64>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Member {
    pub id: i64,
    pub locale: Locale,
    pub full_name: String,
    pub role_title: String,
    pub photo_url: Option<String>,
    pub display_order: i64,
    pub parent_id: Option<i64>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Sponsor {
    pub id: i64,
    pub locale: Locale,
    pub name: String,
    pub logo_url: Option<String>,
    pub website_url: Option<String>,
    pub display_order: i64,
    pub parent_id: Option<i64>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// A photo or video gallery entry; `media_url` is the image URL or the video
/// embed URL depending on the table.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GalleryItem {
    pub id: i64,
    pub locale: Locale,
    pub title: String,
    pub media_url: String,
    pub display_order: i64,
    pub parent_id: Option<i64>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

/// Site-wide contact details, a single upserted row.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ContactInfo {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub map_embed_url: Option<String>,
    pub updated_at: Option<String>,
}

/// President / representative profile, one row per locale.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OfficerProfile {
    pub locale: Locale,
    pub full_name: String,
    pub title: String,
    pub photo_url: Option<String>,
    pub message: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub is_active: bool,
    pub last_login_time: Option<String>,
}

pub mod db_operations;
