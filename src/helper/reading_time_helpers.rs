use serde_json::Value;

/// Fixed reading speed used across the site.
const WORDS_PER_MINUTE: usize = 200;

/// Collects every string stored under a `"text"` key anywhere in a rich-text
/// block tree. The editor nests blocks arbitrarily, so this walks the whole
/// tree rather than assuming a fixed block schema.
fn flatten_block_text(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "text" {
                    if let Value::String(s) = child {
                        if !out.is_empty() {
                            out.push(' ');
                        }
                        out.push_str(s);
                        continue;
                    }
                }
                flatten_block_text(child, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                flatten_block_text(item, out);
            }
        }
        _ => {}
    }
}

fn minutes_for_words(words: usize) -> u32 {
    let minutes = words.div_ceil(WORDS_PER_MINUTE);
    minutes.max(1) as u32
}

/// Estimated reading time in minutes for a rich-text block tree.
/// Always at least 1.
pub fn estimate_from_blocks(blocks: &Value) -> u32 {
    let mut text = String::new();
    flatten_block_text(blocks, &mut text);
    minutes_for_words(text.split_whitespace().count())
}

/// Estimated reading time for a body stored as JSON text. Falls back to
/// tag-stripped plain text when the body is not valid block JSON.
pub fn estimate_from_body(body: &str) -> u32 {
    match serde_json::from_str::<Value>(body) {
        Ok(blocks) => estimate_from_blocks(&blocks),
        Err(_) => estimate_from_html(body),
    }
}

/// Estimated reading time for an HTML string, counting words after the tags
/// are stripped.
pub fn estimate_from_html(html: &str) -> u32 {
    let text = crate::helper::text_helpers::strip_all_html(html);
    minutes_for_words(text.split_whitespace().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_floors_at_one_minute() {
        assert_eq!(estimate_from_blocks(&json!({})), 1);
        assert_eq!(estimate_from_html(""), 1);
    }

    #[test]
    fn short_text_is_one_minute() {
        let blocks = json!({ "blocks": [{ "type": "paragraph", "text": "kısa bir metin" }] });
        assert_eq!(estimate_from_blocks(&blocks), 1);
    }

    #[test]
    fn two_hundred_and_one_words_is_two_minutes() {
        let words = vec!["kelime"; 201].join(" ");
        let blocks = json!({ "blocks": [{ "type": "paragraph", "text": words }] });
        assert_eq!(estimate_from_blocks(&blocks), 2);
    }

    #[test]
    fn nested_blocks_are_flattened() {
        let blocks = json!({
            "blocks": [
                { "type": "heading", "text": "Başlık burada" },
                { "type": "list", "items": [
                    { "text": "birinci madde" },
                    { "text": "ikinci madde" }
                ]}
            ]
        });
        // 7 words total, still under a minute's worth.
        assert_eq!(estimate_from_blocks(&blocks), 1);
    }

    #[test]
    fn monotonic_in_word_count() {
        let mut prev = 0;
        for n in [1usize, 50, 200, 201, 400, 1000, 5000] {
            let words = vec!["w"; n].join(" ");
            let blocks = json!({ "text": words });
            let minutes = estimate_from_blocks(&blocks);
            assert!(minutes >= prev, "estimate dropped at {} words", n);
            prev = minutes;
        }
    }

    #[test]
    fn html_fallback_strips_tags() {
        let html = "<p>Bir <b>iki</b> üç</p>";
        assert_eq!(estimate_from_html(html), 1);
    }

    #[test]
    fn body_string_dispatches_on_json_validity() {
        assert_eq!(estimate_from_body(r#"{"text":"merhaba dünya"}"#), 1);
        assert_eq!(estimate_from_body("<p>düz html</p>"), 1);
    }
}
