use crate::models::{ContentKind, ContentRecord, ContentSummary, Locale};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result as RusqliteResult, Row};

/// Field set for creating or updating a slugged-content row. The caller has
/// already validated and slugified everything.
#[derive(Debug)]
pub struct ContentInput<'a> {
    pub locale: Locale,
    pub title: &'a str,
    pub slug: &'a str,
    pub summary: &'a str,
    pub body: &'a str,
    pub cover_image: Option<&'a str>,
    pub priority: Option<&'a str>,
    pub published_at: Option<&'a str>,
    pub is_active: bool,
    pub parent_id: Option<i64>,
}

const RECORD_COLUMNS: &str = "id, locale, title, slug, summary, body, cover_image, priority, \
     published_at, is_active, parent_id, created_at, updated_at";

fn row_to_record(row: &Row) -> RusqliteResult<ContentRecord> {
    let locale: String = row.get(1)?;
    Ok(ContentRecord {
        id: row.get(0)?,
        locale: locale.parse().unwrap_or(Locale::Tr),
        title: row.get(2)?,
        slug: row.get(3)?,
        summary: row.get(4)?,
        body: row.get(5)?,
        cover_image: row.get(6)?,
        priority: row.get(7)?,
        published_at: row.get(8)?,
        is_active: row.get(9)?,
        parent_id: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn row_to_summary(row: &Row) -> RusqliteResult<ContentSummary> {
    let locale: String = row.get(1)?;
    Ok(ContentSummary {
        id: row.get(0)?,
        locale: locale.parse().unwrap_or(Locale::Tr),
        title: row.get(2)?,
        slug: row.get(3)?,
        summary: row.get(4)?,
        cover_image: row.get(5)?,
        priority: row.get(6)?,
        published_at: row.get(7)?,
        is_active: row.get(8)?,
        parent_id: row.get(9)?,
    })
}

pub fn create_content(
    conn: &Connection,
    kind: ContentKind,
    input: &ContentInput,
) -> RusqliteResult<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        &format!(
            "INSERT INTO {} (locale, title, slug, summary, body, cover_image, priority, \
             published_at, is_active, parent_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            kind.table()
        ),
        params![
            input.locale.as_str(),
            input.title,
            input.slug,
            input.summary,
            input.body,
            input.cover_image,
            input.priority,
            input.published_at,
            input.is_active,
            input.parent_id,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn read_content(
    conn: &Connection,
    kind: ContentKind,
    id: i64,
) -> RusqliteResult<Option<ContentRecord>> {
    conn.query_row(
        &format!(
            "SELECT {} FROM {} WHERE id = ?1",
            RECORD_COLUMNS,
            kind.table()
        ),
        [id],
        row_to_record,
    )
    .optional()
}

/// Public detail lookup. `only_active` hides unpublished rows from the
/// public site while the admin area still sees them.
pub fn read_content_by_slug(
    conn: &Connection,
    kind: ContentKind,
    locale: Locale,
    slug: &str,
    only_active: bool,
) -> RusqliteResult<Option<ContentRecord>> {
    let mut sql = format!(
        "SELECT {} FROM {} WHERE locale = ?1 AND slug = ?2",
        RECORD_COLUMNS,
        kind.table()
    );
    if only_active {
        sql.push_str(" AND is_active = 1");
    }
    conn.query_row(&sql, params![locale.as_str(), slug], row_to_record)
        .optional()
}

pub fn list_content(
    conn: &Connection,
    kind: ContentKind,
    locale: Option<Locale>,
    only_active: bool,
    limit: u32,
    offset: u32,
) -> RusqliteResult<Vec<ContentSummary>> {
    let mut sql = format!(
        "SELECT id, locale, title, slug, summary, cover_image, priority, published_at, \
         is_active, parent_id FROM {} WHERE 1=1",
        kind.table()
    );
    if locale.is_some() {
        sql.push_str(" AND locale = ?1");
    }
    if only_active {
        sql.push_str(" AND is_active = 1");
    }
    sql.push_str(" ORDER BY COALESCE(published_at, created_at) DESC, id DESC LIMIT ?2 OFFSET ?3");

    let mut stmt = conn.prepare(&sql)?;
    let rows = match locale {
        Some(loc) => stmt.query_map(params![loc.as_str(), limit, offset], row_to_summary)?,
        // Placeholder ?1 is absent from the SQL in this branch, so the
        // remaining parameters shift down to ?2/?3 positions.
        None => {
            let sql_all = sql.replace("LIMIT ?2 OFFSET ?3", "LIMIT ?1 OFFSET ?2");
            drop(stmt);
            let mut stmt_all = conn.prepare(&sql_all)?;
            let collected: RusqliteResult<Vec<ContentSummary>> = stmt_all
                .query_map(params![limit, offset], row_to_summary)?
                .collect();
            return collected;
        }
    };
    rows.collect()
}

pub fn update_content(
    conn: &Connection,
    kind: ContentKind,
    id: i64,
    input: &ContentInput,
) -> RusqliteResult<usize> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        &format!(
            "UPDATE {} SET locale = ?1, title = ?2, slug = ?3, summary = ?4, body = ?5, \
             cover_image = ?6, priority = ?7, published_at = ?8, is_active = ?9, \
             parent_id = ?10, updated_at = ?11 WHERE id = ?12",
            kind.table()
        ),
        params![
            input.locale.as_str(),
            input.title,
            input.slug,
            input.summary,
            input.body,
            input.cover_image,
            input.priority,
            input.published_at,
            input.is_active,
            input.parent_id,
            now,
            id,
        ],
    )
}

pub fn delete_content(conn: &Connection, kind: ContentKind, id: i64) -> RusqliteResult<usize> {
    conn.execute(&format!("DELETE FROM {} WHERE id = ?1", kind.table()), [id])
}

/// Finds the translation sibling of a row: either the record its
/// `parent_id` points at, or the record pointing back at it. With
/// `only_active` an unpublished sibling is treated as absent, so public
/// detail responses never link to it.
pub fn read_translation_counterpart(
    conn: &Connection,
    kind: ContentKind,
    record: &ContentRecord,
    only_active: bool,
) -> RusqliteResult<Option<ContentRecord>> {
    if let Some(parent_id) = record.parent_id {
        let sibling = read_content(conn, kind, parent_id)?;
        return Ok(sibling.filter(|s| !only_active || s.is_active));
    }
    let mut sql = format!(
        "SELECT {} FROM {} WHERE parent_id = ?1",
        RECORD_COLUMNS,
        kind.table()
    );
    if only_active {
        sql.push_str(" AND is_active = 1");
    }
    sql.push_str(" LIMIT 1");
    conn.query_row(&sql, [record.id], row_to_record).optional()
}

/// Slug uniqueness probe within a locale. `exclude_id` skips the row being
/// edited so an unchanged slug does not collide with itself.
pub fn slug_exists(
    conn: &Connection,
    kind: ContentKind,
    locale: Locale,
    slug: &str,
    exclude_id: Option<i64>,
) -> RusqliteResult<bool> {
    conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE locale = ?1 AND slug = ?2 AND id != ?3)",
            kind.table()
        ),
        params![locale.as_str(), slug, exclude_id.unwrap_or(0)],
        |row| row.get(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::db_setup;

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        db_setup::setup_content_db(&mut conn).unwrap();
        conn
    }

    fn sample_input(locale: Locale, slug: &'static str) -> ContentInput<'static> {
        ContentInput {
            locale,
            title: "Yeni Etkinlik",
            slug,
            summary: "Kisa ozet",
            body: r#"{"blocks":[{"type":"paragraph","text":"Merhaba"}]}"#,
            cover_image: None,
            priority: None,
            published_at: Some("2024-05-01T10:00:00+00:00"),
            is_active: true,
            parent_id: None,
        }
    }

    #[test]
    fn create_then_read_round_trips() {
        let conn = test_conn();
        let id = create_content(&conn, ContentKind::News, &sample_input(Locale::Tr, "yeni-etkinlik"))
            .unwrap();
        let rec = read_content(&conn, ContentKind::News, id).unwrap().unwrap();
        assert_eq!(rec.title, "Yeni Etkinlik");
        assert_eq!(rec.slug, "yeni-etkinlik");
        assert_eq!(rec.locale, Locale::Tr);
        assert!(rec.is_active);
        assert!(rec.updated_at.is_none());
    }

    #[test]
    fn update_then_read_reflects_change() {
        let conn = test_conn();
        let id = create_content(&conn, ContentKind::Article, &sample_input(Locale::Tr, "ilk"))
            .unwrap();
        let mut input = sample_input(Locale::Tr, "ilk");
        input.title = "Guncellenmis Baslik";
        input.is_active = false;
        let changed = update_content(&conn, ContentKind::Article, id, &input).unwrap();
        assert_eq!(changed, 1);
        let rec = read_content(&conn, ContentKind::Article, id).unwrap().unwrap();
        assert_eq!(rec.title, "Guncellenmis Baslik");
        assert!(!rec.is_active);
        assert!(rec.updated_at.is_some());
    }

    #[test]
    fn delete_then_read_is_none() {
        let conn = test_conn();
        let id = create_content(&conn, ContentKind::Project, &sample_input(Locale::En, "first"))
            .unwrap();
        assert_eq!(delete_content(&conn, ContentKind::Project, id).unwrap(), 1);
        assert!(read_content(&conn, ContentKind::Project, id).unwrap().is_none());
    }

    #[test]
    fn slug_lookup_respects_locale_and_active_flag() {
        let conn = test_conn();
        create_content(&conn, ContentKind::News, &sample_input(Locale::Tr, "ortak-slug")).unwrap();
        let mut inactive = sample_input(Locale::En, "ortak-slug");
        inactive.is_active = false;
        create_content(&conn, ContentKind::News, &inactive).unwrap();

        assert!(read_content_by_slug(&conn, ContentKind::News, Locale::Tr, "ortak-slug", true)
            .unwrap()
            .is_some());
        // Inactive English sibling hidden from the public lookup.
        assert!(read_content_by_slug(&conn, ContentKind::News, Locale::En, "ortak-slug", true)
            .unwrap()
            .is_none());
        assert!(read_content_by_slug(&conn, ContentKind::News, Locale::En, "ortak-slug", false)
            .unwrap()
            .is_some());
    }

    #[test]
    fn slug_exists_skips_excluded_row() {
        let conn = test_conn();
        let id = create_content(&conn, ContentKind::Service, &sample_input(Locale::Tr, "hizmet"))
            .unwrap();
        assert!(slug_exists(&conn, ContentKind::Service, Locale::Tr, "hizmet", None).unwrap());
        assert!(!slug_exists(&conn, ContentKind::Service, Locale::Tr, "hizmet", Some(id)).unwrap());
        assert!(!slug_exists(&conn, ContentKind::Service, Locale::En, "hizmet", None).unwrap());
    }

    #[test]
    fn list_filters_by_locale() {
        let conn = test_conn();
        create_content(&conn, ContentKind::Notice, &sample_input(Locale::Tr, "bir")).unwrap();
        create_content(&conn, ContentKind::Notice, &sample_input(Locale::Tr, "iki")).unwrap();
        create_content(&conn, ContentKind::Notice, &sample_input(Locale::En, "one")).unwrap();

        let tr = list_content(&conn, ContentKind::Notice, Some(Locale::Tr), true, 10, 0).unwrap();
        assert_eq!(tr.len(), 2);
        let all = list_content(&conn, ContentKind::Notice, None, true, 10, 0).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn counterpart_lookup_hides_inactive_siblings() {
        let conn = test_conn();
        let parent = create_content(&conn, ContentKind::News, &sample_input(Locale::Tr, "ana"))
            .unwrap();
        let mut sibling = sample_input(Locale::En, "main");
        sibling.parent_id = Some(parent);
        sibling.is_active = false;
        create_content(&conn, ContentKind::News, &sibling).unwrap();

        let parent_rec = read_content(&conn, ContentKind::News, parent).unwrap().unwrap();
        // Reverse direction: the inactive English row points at the parent.
        assert!(
            read_translation_counterpart(&conn, ContentKind::News, &parent_rec, true)
                .unwrap()
                .is_none()
        );
        let hidden = read_translation_counterpart(&conn, ContentKind::News, &parent_rec, false)
            .unwrap()
            .unwrap();
        assert_eq!(hidden.slug, "main");

        // Forward direction: deactivate the parent and look up from the child.
        let mut parent_input = sample_input(Locale::Tr, "ana");
        parent_input.is_active = false;
        update_content(&conn, ContentKind::News, parent, &parent_input).unwrap();
        let child_rec =
            read_content_by_slug(&conn, ContentKind::News, Locale::En, "main", false)
                .unwrap()
                .unwrap();
        assert!(
            read_translation_counterpart(&conn, ContentKind::News, &child_rec, true)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn deleting_parent_nulls_sibling_link() {
        let conn = test_conn();
        let parent = create_content(&conn, ContentKind::News, &sample_input(Locale::Tr, "ana"))
            .unwrap();
        let mut sibling = sample_input(Locale::En, "main");
        sibling.parent_id = Some(parent);
        let child = create_content(&conn, ContentKind::News, &sibling).unwrap();

        delete_content(&conn, ContentKind::News, parent).unwrap();
        let rec = read_content(&conn, ContentKind::News, child).unwrap().unwrap();
        assert!(rec.parent_id.is_none());
    }
}
