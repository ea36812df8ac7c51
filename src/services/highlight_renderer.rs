//! 高亮渲染 - 业务能力层
//!
//! 在导入文档的 HTML 中给标记文字包上带颜色的 `<span>`。
//! 高亮只是标记列表的派生结果，任何结构性变化之后都通过
//! [`reapply_all`] 先全部剥离再按列表顺序重新生成。

use crate::models::marker::{ExcludeMarker, HighlightId, HighlightRole, SectionMarker};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// 所有高亮 span 共有的 class
pub const HIGHLIGHT_CLASS: &str = "marker-highlight";

const CLOSE_TAG: &str = "</span>";

static OPEN_TAG_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn open_tag_re() -> Option<&'static Regex> {
    OPEN_TAG_RE
        .get_or_init(|| {
            match Regex::new(r#"<span class="marker-highlight[^"]*" data-marker-id="([^"]+)"[^>]*>"#) {
                Ok(re) => Some(re),
                Err(e) => {
                    warn!("高亮标签正则编译失败: {}", e);
                    None
                }
            }
        })
        .as_ref()
}

fn open_tag(role: HighlightRole, id: &str) -> String {
    format!(
        r#"<span class="{} marker-{}" data-marker-id="{}" style="background-color: {};">"#,
        HIGHLIGHT_CLASS,
        role.as_str(),
        id,
        role.color()
    )
}

/// 单词之间允许的间隔：空白或不换行空格实体
const WORD_GAP: &str = r"(?:\s|&nbsp;|&#160;)+";

/// 文档转换器对单引号的几种写法
const APOSTROPHE_ENTITIES: [&str; 3] = ["&#39;", "&#x27;", "&apos;"];

fn escape_html(text: &str, apostrophe: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', apostrophe)
}

/// 位置是否落在某个标签 `<...>` 内部
fn inside_tag(html: &str, pos: usize) -> bool {
    let before = &html[..pos];
    match (before.rfind('<'), before.rfind('>')) {
        (Some(lt), Some(gt)) => lt > gt,
        (Some(_), None) => true,
        _ => false,
    }
}

/// 大小写不敏感地查找文字，单词之间允许任意空白和 `&nbsp;`
fn find_text(html: &str, words: &[String]) -> Option<Range<usize>> {
    let pattern = format!(
        "(?i){}",
        words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join(WORD_GAP)
    );
    let re = match Regex::new(&pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!("无法为高亮文字构建正则: {}", e);
            return None;
        }
    };

    let found = re
        .find_iter(html)
        .find(|m| !inside_tag(html, m.start()))
        .map(|m| m.range());
    found
}

fn find_open_span(rest: &str) -> Option<usize> {
    rest.match_indices("<span").map(|(i, _)| i).find(|&i| {
        matches!(
            rest.as_bytes().get(i + 5),
            Some(b' ' | b'>' | b'\t' | b'\n' | b'\r' | b'/')
        )
    })
}

/// 从 `from`（某个开始标签之后）开始，找到与之配对的 `</span>` 的位置
fn find_matching_close(html: &str, from: usize) -> Option<usize> {
    let lower = html.to_ascii_lowercase();
    let mut depth = 1usize;
    let mut pos = from;

    while pos < lower.len() {
        let rest = &lower[pos..];
        let next_open = find_open_span(rest);
        let next_close = rest.find(CLOSE_TAG)?;

        match next_open {
            Some(open) if open < next_close => {
                depth += 1;
                pos += open + 5;
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos + next_close);
                }
                pos += next_close + CLOSE_TAG.len();
            }
        }
    }

    None
}

/// 去掉 `tag` 范围的开始标签及其配对的结束标签，保留中间内容
fn unwrap_span(html: &str, tag: Range<usize>) -> Option<String> {
    let close = find_matching_close(html, tag.end)?;
    let mut out = String::with_capacity(html.len());
    out.push_str(&html[..tag.start]);
    out.push_str(&html[tag.end..close]);
    out.push_str(&html[close + CLOSE_TAG.len()..]);
    Some(out)
}

/// 给 `text` 第一次出现的位置加上高亮
///
/// - `id` 已经存在时不做任何事，避免重复包裹
/// - 找不到文字时原样返回，标记本身仍然有效
pub fn apply_highlight(html: &str, text: &str, role: HighlightRole, id: &str) -> String {
    if html.contains(&format!(r#"data-marker-id="{}""#, id)) {
        debug!("高亮 {} 已存在，跳过", id);
        return html.to_string();
    }

    let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    if words.is_empty() {
        return html.to_string();
    }

    let range = find_text(html, &words).or_else(|| {
        let mut variants: Vec<Vec<String>> = APOSTROPHE_ENTITIES
            .iter()
            .map(|apostrophe| words.iter().map(|w| escape_html(w, apostrophe)).collect())
            .collect();
        variants.dedup();
        variants
            .iter()
            .filter(|escaped| **escaped != words)
            .find_map(|escaped| find_text(html, escaped))
    });

    match range {
        Some(range) => {
            let mut out = String::with_capacity(html.len() + 128);
            out.push_str(&html[..range.start]);
            out.push_str(&open_tag(role, id));
            out.push_str(&html[range.clone()]);
            out.push_str(CLOSE_TAG);
            out.push_str(&html[range.end..]);
            out
        }
        None => {
            debug!("文档中找不到高亮文字 ({}): {}", id, text);
            html.to_string()
        }
    }
}

/// 去掉指定 ID 的高亮，保留其中的文字
pub fn remove_highlight(html: &str, id: &str) -> String {
    let Some(re) = open_tag_re() else {
        return html.to_string();
    };

    let tag = re
        .captures_iter(html)
        .find(|caps| &caps[1] == id)
        .and_then(|caps| caps.get(0))
        .map(|m| m.range());

    tag.and_then(|tag| unwrap_span(html, tag))
        .unwrap_or_else(|| html.to_string())
}

/// 去掉所有高亮
pub fn remove_all_highlights(html: &str) -> String {
    let Some(re) = open_tag_re() else {
        return html.to_string();
    };

    let mut out = html.to_string();
    let mut search_from = 0;

    while let Some(tag) = re.find_at(&out, search_from).map(|m| m.range()) {
        match unwrap_span(&out, tag.clone()) {
            Some(unwrapped) => {
                out = unwrapped;
                search_from = tag.start;
            }
            None => {
                // 没有配对的结束标签，跳过这个开始标签
                search_from = tag.end;
            }
        }
    }

    out
}

/// 标准的重新渲染流程：先全部剥离，再按列表顺序重新加上高亮
pub fn reapply_all(
    html: &str,
    markers: &[SectionMarker],
    exclude_markers: &[ExcludeMarker],
) -> String {
    let mut out = remove_all_highlights(html);

    for marker in markers {
        let start_id = HighlightId::new(HighlightRole::Start, marker.id).to_string();
        out = apply_highlight(&out, &marker.start, HighlightRole::Start, &start_id);

        if let Some(end) = &marker.end {
            let end_id = HighlightId::new(HighlightRole::End, marker.id).to_string();
            out = apply_highlight(&out, end, HighlightRole::End, &end_id);
        }
    }

    for exclude in exclude_markers {
        let id = HighlightId::new(HighlightRole::Exclude, exclude.id).to_string();
        out = apply_highlight(&out, &exclude.text, HighlightRole::Exclude, &id);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "<h1>Reading Log</h1><p>Summary: write three sentences.</p><p>Vocabulary: define each word.</p>";

    #[test]
    fn test_apply_wraps_first_case_insensitive_match() {
        let html = apply_highlight(DOC, "summary:", HighlightRole::Start, "start-0");
        assert!(html.contains(
            r#"data-marker-id="start-0" style="background-color: #c8e6c9;">Summary:</span>"#
        ));
        assert!(html.contains(r#"class="marker-highlight marker-start""#));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let once = apply_highlight(DOC, "Summary:", HighlightRole::Start, "start-0");
        let twice = apply_highlight(&once, "Summary:", HighlightRole::Start, "start-0");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_apply_missing_text_returns_input() {
        let html = apply_highlight(DOC, "Conclusion", HighlightRole::End, "end-0");
        assert_eq!(html, DOC);
    }

    #[test]
    fn test_round_trip_removal() {
        let html = apply_highlight(DOC, "define each word", HighlightRole::Exclude, "exclude-0");
        assert_ne!(html, DOC);
        assert_eq!(remove_all_highlights(&html), DOC);
        assert_eq!(remove_highlight(&html, "exclude-0"), DOC);
    }

    #[test]
    fn test_apply_skips_text_inside_tags() {
        let doc = r#"<p class="summary">Summary here</p>"#;
        let html = apply_highlight(doc, "summary", HighlightRole::Start, "start-0");
        assert!(html.starts_with(r#"<p class="summary"><span"#));
    }

    #[test]
    fn test_apply_matches_across_whitespace_and_entities() {
        let doc = "<p>Tom &amp; Jerry\n   went home</p>";
        let html = apply_highlight(doc, "Tom & Jerry went", HighlightRole::Start, "start-1");
        assert!(html.contains(">Tom &amp; Jerry\n   went</span> home"));
    }

    #[test]
    fn test_apply_matches_nbsp_and_apostrophe_entities() {
        let doc = "<p>it&#39;s here</p>";
        let html = apply_highlight(doc, "it's here", HighlightRole::Start, "start-0");
        assert!(html.contains(">it&#39;s here</span>"));

        let doc = "<p>don&#x27;t stop</p>";
        let html = apply_highlight(doc, "don't", HighlightRole::End, "end-0");
        assert!(html.contains(">don&#x27;t</span> stop"));

        let doc = "<p>Part&nbsp;A: Vocabulary</p>";
        let html = apply_highlight(doc, "Part A:", HighlightRole::Start, "start-1");
        assert!(html.contains(">Part&nbsp;A:</span> Vocabulary"));
        assert_eq!(remove_all_highlights(&html), doc);
    }

    #[test]
    fn test_remove_highlight_only_touches_given_id() {
        let html = apply_highlight(DOC, "Summary:", HighlightRole::Start, "start-0");
        let html = apply_highlight(&html, "Vocabulary:", HighlightRole::Start, "start-1");

        let removed = remove_highlight(&html, "start-0");
        assert!(!removed.contains(r#"data-marker-id="start-0""#));
        assert!(removed.contains(r#"data-marker-id="start-1""#));

        // 不存在的 ID 原样返回
        assert_eq!(remove_highlight(&html, "end-9"), html);
    }

    #[test]
    fn test_remove_keeps_nested_highlight() {
        let html = apply_highlight(DOC, "write three sentences", HighlightRole::Start, "start-0");
        let html = apply_highlight(&html, "three", HighlightRole::Exclude, "exclude-0");
        assert!(html.contains(r#"data-marker-id="exclude-0""#));

        let removed = remove_highlight(&html, "start-0");
        assert!(removed.contains(r#"data-marker-id="exclude-0""#));
        assert!(!removed.contains(r#"data-marker-id="start-0""#));
        assert_eq!(remove_all_highlights(&html), DOC);
    }

    #[test]
    fn test_remove_all_keeps_document_spans() {
        let doc = r#"<p><span class="underline">Name:</span> ______</p>"#;
        let html = apply_highlight(doc, "Name:", HighlightRole::Exclude, "exclude-0");
        assert_eq!(remove_all_highlights(&html), doc);
    }

    #[test]
    fn test_reapply_all_uses_marker_ids() {
        let mut summary = SectionMarker::new(4, "Summary:");
        summary.end = Some("sentences.".to_string());
        let vocab = SectionMarker::new(7, "Vocabulary:");
        let exclude = ExcludeMarker::new(2, "Reading Log");

        let html = reapply_all(DOC, &[summary.clone(), vocab], &[exclude]);
        assert!(html.contains(r#"data-marker-id="start-4""#));
        assert!(html.contains(r#"data-marker-id="end-4""#));
        assert!(html.contains(r#"data-marker-id="start-7""#));
        assert!(html.contains(r#"data-marker-id="exclude-2""#));

        // 重新渲染是稳定的
        let again = reapply_all(&html, &[summary], &[]);
        assert!(!again.contains("start-7"));
        assert!(!again.contains("exclude-2"));
        assert_eq!(again, reapply_all(DOC, &[SectionMarker { end: Some("sentences.".to_string()), ..SectionMarker::new(4, "Summary:") }], &[]));
    }
}
