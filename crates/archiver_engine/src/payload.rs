use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use scraper::{Html, Selector};
use serde::{Deserialize, Deserializer};

use crate::filename::clean_title;
use crate::{Course, ModuleInfo, PageError, PageFailureKind};

/// Client-side hydration script embedded in every classroom page.
pub const PAYLOAD_SELECTOR: &str = "script#__NEXT_DATA__";

const UNTITLED: &str = "Untitled";

/// Decode raw bytes into UTF-8 using: BOM -> Content-Type charset -> chardetng fallback.
pub fn decode_body(bytes: &[u8], content_type: Option<&str>) -> Result<String, PageError> {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim_matches(&[' ', '"', '\''][..]).to_string())
    })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<String, PageError> {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(PageError::new(
            PageFailureKind::Decode,
            format!("invalid {} byte sequence", enc.name()),
        ));
    }
    Ok(text.into_owned())
}

/// Text of the hydration script, or `MissingPayload` when absent or blank.
pub fn extract_hydration_payload(html: &str) -> Result<String, PageError> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse(PAYLOAD_SELECTOR)
        .map_err(|err| PageError::new(PageFailureKind::MissingPayload, err.to_string()))?;
    doc.select(&selector)
        .next()
        .map(|script| script.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| PageError::new(PageFailureKind::MissingPayload, PAYLOAD_SELECTOR))
}

/// Page data fields are often `null` rather than absent; both read as empty.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Metadata {
    #[serde(deserialize_with = "nullable")]
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CourseEntry {
    #[serde(deserialize_with = "nullable")]
    name: String,
    #[serde(deserialize_with = "nullable")]
    metadata: Metadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ClassroomProps {
    #[serde(deserialize_with = "nullable")]
    all_courses: Vec<CourseEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ClassroomPage {
    #[serde(deserialize_with = "nullable")]
    page_props: ClassroomProps,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ClassroomData {
    #[serde(deserialize_with = "nullable")]
    props: ClassroomPage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModuleCourse {
    #[serde(deserialize_with = "nullable")]
    id: String,
    #[serde(deserialize_with = "nullable")]
    metadata: Metadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ModuleChild {
    #[serde(deserialize_with = "nullable")]
    course: ModuleCourse,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CourseTree {
    #[serde(deserialize_with = "nullable")]
    children: Vec<ModuleChild>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CourseProps {
    #[serde(deserialize_with = "nullable")]
    course: CourseTree,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CoursePage {
    #[serde(deserialize_with = "nullable")]
    page_props: CourseProps,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CourseData {
    #[serde(deserialize_with = "nullable")]
    props: CoursePage,
}

/// Courses listed on the classroom page.
pub fn parse_courses(raw: &str, classroom_url: &str) -> Result<Vec<Course>, serde_json::Error> {
    let data: ClassroomData = serde_json::from_str(raw)?;
    let base = classroom_url.trim_end_matches('/');
    Ok(data
        .props
        .page_props
        .all_courses
        .into_iter()
        .map(|entry| Course {
            title: clean_title(&entry.metadata.title),
            url: format!("{base}/{}", entry.name),
        })
        .collect())
}

/// Modules listed on a course page; each one is addressed by `?md={id}`.
pub fn parse_modules(raw: &str, course_url: &str) -> Result<Vec<ModuleInfo>, serde_json::Error> {
    let data: CourseData = serde_json::from_str(raw)?;
    Ok(data
        .props
        .page_props
        .course
        .children
        .into_iter()
        .map(|child| {
            let ModuleCourse { id, metadata } = child.course;
            let title = if metadata.title.is_empty() {
                UNTITLED
            } else {
                metadata.title.as_str()
            };
            ModuleInfo {
                url: format!("{course_url}?md={id}"),
                title: clean_title(title),
                id,
            }
        })
        .collect())
}
