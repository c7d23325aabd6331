//! Stage two: pull the field battery out of the saved pages.
//!
//! Every rule is a single selector lookup; a rule that matches nothing
//! degrades to the `"N/A"` sentinel instead of erroring, and malformed HTML
//! just fails to match. The one exception is the name rule: without a name
//! there is no key to file the record under, so the whole page is skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};

use crate::{info_time, Error, Result, PAGE_EXT};

/// Placeholder for a field whose rule matched nothing.
pub const NOT_AVAILABLE: &str = "N/A";

/// Boilerplate sentence injected into claimed schools' name headings;
/// stripped from extracted names.
const CLAIM_NOTICE: &str =
    "This school has been claimed by the school or a school representative.";

/// The CSS rules the extractor runs, held as configuration rather than
/// embedded literals so fixtures and future page layouts can substitute
/// their own. Defaults are the niche.com profile rules.
#[derive(Debug, Clone)]
pub struct SelectorSchema {
    /// School name heading; matches the exact class attribute.
    pub name: String,
    /// A letter-grade element. The overall grade is the first one in the
    /// document; the rating sections hold one each.
    pub grade: String,
    /// One rating section, holding a label and a grade.
    pub grade_section: String,
    /// The category label inside a rating section.
    pub grade_label: String,
    /// The school website link.
    pub website: String,
    /// The school telephone link.
    pub telephone: String,
    /// The compact address block.
    pub address: String,
}

impl Default for SelectorSchema {
    fn default() -> Self {
        SelectorSchema {
            name: r#"h1[class="MuiTypography-root MuiTypography-headlineMedium nss-7vbaor"]"#
                .to_owned(),
            grade: "div.niche__grade".to_owned(),
            grade_section: "div.profile-grade--two".to_owned(),
            grade_label: "div.profile-grade__label".to_owned(),
            website: "a.profile__website__link".to_owned(),
            telephone: "a.profile__telephone__link".to_owned(),
            address: "address.profile__address--compact".to_owned(),
        }
    }
}

/// The schema compiled once per run.
struct Selectors {
    name: Selector,
    grade: Selector,
    grade_section: Selector,
    grade_label: Selector,
    website: Selector,
    telephone: Selector,
    address: Selector,
}

impl Selectors {
    fn compile(schema: &SelectorSchema) -> Result<Self> {
        Ok(Selectors {
            name: create_selector(&schema.name)?,
            grade: create_selector(&schema.grade)?,
            grade_section: create_selector(&schema.grade_section)?,
            grade_label: create_selector(&schema.grade_label)?,
            website: create_selector(&schema.website)?,
            telephone: create_selector(&schema.telephone)?,
            address: create_selector(&schema.address)?,
        })
    }
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::ParseInvalidSelector(sel_str.into()))
}

/// One school's extracted field set. Every field is either extracted text or
/// the `"N/A"` sentinel; declaration order is the JSON key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolRecord {
    #[serde(rename = "School")]
    pub school: String,
    #[serde(rename = "Overall Niche Grade")]
    pub overall_grade: String,
    #[serde(rename = "Academics")]
    pub academics: String,
    #[serde(rename = "Diversity")]
    pub diversity: String,
    #[serde(rename = "Teachers")]
    pub teachers: String,
    #[serde(rename = "College Prep")]
    pub college_prep: String,
    #[serde(rename = "Clubs & Activities")]
    pub clubs_activities: String,
    #[serde(rename = "Administration")]
    pub administration: String,
    #[serde(rename = "Sports")]
    pub sports: String,
    #[serde(rename = "Food")]
    pub food: String,
    #[serde(rename = "Resources & Facilities")]
    pub resources_facilities: String,
    #[serde(rename = "Website")]
    pub website: String,
    #[serde(rename = "Contact")]
    pub contact: String,
    #[serde(rename = "Address")]
    pub address: String,
}

/// Parses every `.html` file in `input_dir` (non-recursive, other extensions
/// ignored) and aggregates the records into a name-keyed map. A later file
/// with an already-seen name overwrites the earlier record. Unreadable files
/// or directories abort the run.
pub fn extract_all(
    input_dir: &Path,
    schema: &SelectorSchema,
) -> Result<BTreeMap<String, SchoolRecord>> {
    let selectors = Selectors::compile(schema)?;
    let mut records = BTreeMap::new();

    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(PAGE_EXT) {
            continue;
        }
        let html = fs::read_to_string(&path)?;
        let doc = Html::parse_document(&html);
        match extract_record(&doc, &selectors) {
            Some(record) => {
                records.insert(record.school.clone(), record);
            }
            None => info_time!("No school name found in {}, skipped", path.display()),
        }
    }
    Ok(records)
}

/// Runs the battery against one parsed page. `None` when the name rule
/// matched nothing, in which case no record is emitted at all. Every other
/// rule is evaluated exactly once and falls back to the sentinel.
fn extract_record(doc: &Html, sel: &Selectors) -> Option<SchoolRecord> {
    let school = school_name(doc, sel)?;

    Some(SchoolRecord {
        school,
        overall_grade: overall_grade(doc, sel).unwrap_or_else(not_available),
        academics: category_grade(doc, sel, "Academics").unwrap_or_else(not_available),
        diversity: category_grade(doc, sel, "Diversity").unwrap_or_else(not_available),
        teachers: category_grade(doc, sel, "Teachers").unwrap_or_else(not_available),
        college_prep: category_grade(doc, sel, "College Prep").unwrap_or_else(not_available),
        clubs_activities: category_grade(doc, sel, "Clubs & Activities")
            .unwrap_or_else(not_available),
        administration: category_grade(doc, sel, "Administration").unwrap_or_else(not_available),
        sports: category_grade(doc, sel, "Sports").unwrap_or_else(not_available),
        food: category_grade(doc, sel, "Food").unwrap_or_else(not_available),
        resources_facilities: category_grade(doc, sel, "Resources & Facilities")
            .unwrap_or_else(not_available),
        website: link_text(doc, &sel.website).unwrap_or_else(not_available),
        contact: link_text(doc, &sel.telephone).unwrap_or_else(not_available),
        address: address(doc, sel).unwrap_or_else(not_available),
    })
}

fn not_available() -> String {
    NOT_AVAILABLE.to_owned()
}

/// Name rule: the first match's collected text, with the claim notice
/// removed and the result trimmed. An empty leftover counts as no name.
fn school_name(doc: &Html, sel: &Selectors) -> Option<String> {
    let heading = doc.select(&sel.name).next()?;
    let name = element_text(heading).replace(CLAIM_NOTICE, "");
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_owned())
}

/// Overall grade: the first grade element anywhere in the document. Profile
/// pages put the overall block before the per-category sections.
fn overall_grade(doc: &Html, sel: &Selectors) -> Option<String> {
    doc.select(&sel.grade)
        .next()
        .map(|grade| normalize_grade(&element_text(grade)))
}

/// Category grade: scan the rating sections for one whose label reads
/// exactly `category` and which carries a grade element. A section with a
/// matching label but no grade is passed over and the scan continues.
fn category_grade(doc: &Html, sel: &Selectors, category: &str) -> Option<String> {
    doc.select(&sel.grade_section).find_map(|section| {
        let label = section.select(&sel.grade_label).next()?;
        if element_text(label).trim() != category {
            return None;
        }
        section
            .select(&sel.grade)
            .next()
            .map(|grade| normalize_grade(&element_text(grade)))
    })
}

/// Website / telephone rule: the first match's trimmed text.
fn link_text(doc: &Html, selector: &Selector) -> Option<String> {
    doc.select(selector)
        .next()
        .map(|link| element_text(link).trim().to_owned())
}

/// Address rule: the block's immediate children joined, text nodes trimmed,
/// each `<br>` contributing a `", "` separator.
fn address(doc: &Html, sel: &Selectors) -> Option<String> {
    let block = doc.select(&sel.address).next()?;
    let mut parts = Vec::new();
    for child in block.children() {
        match child.value() {
            Node::Text(text) => parts.push(text.trim().to_owned()),
            Node::Element(element) if element.name() == "br" => parts.push(", ".to_owned()),
            _ => {}
        }
    }
    Some(parts.concat())
}

/// Normalizes raw grade text: every occurrence of the literal word "grade"
/// is deleted, the remainder trimmed, and a " minus" suffix folded into
/// "-", so "grade A minus" comes out as "A-".
fn normalize_grade(raw: &str) -> String {
    raw.replace("grade", "").trim().replace(" minus", "-")
}

fn element_text(element: ElementRef) -> String {
    element.text().collect()
}
