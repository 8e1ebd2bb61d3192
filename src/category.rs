// Category label <-> source code mapping
//
// Codes follow the Korea Tourism Organization accommodation classification.
// The primary table is what the filter bar offers; the extended table covers
// codes that appear on records but have no filter chip of their own.

pub const TABLE_VERSION: u32 = 2;

// Label that means "no category filter"
pub const ALL_LABEL: &str = "전체";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub label: &'static str,
    pub icon: &'static str,
    pub code: &'static str,
}

pub const CATEGORIES: &[Category] = &[
    Category { label: "호텔", icon: "🏢", code: "B02010100" },
    Category { label: "펜션", icon: "🏡", code: "B02010700" },
    Category { label: "한옥", icon: "🏮", code: "B02011600" },
    Category { label: "게스트하우스", icon: "🏘️", code: "B02011100" },
    Category { label: "모텔", icon: "🛏️", code: "B02010900" },
    Category { label: "캠핑", icon: "⛺", code: "A02030100" },
    Category { label: "리조트", icon: "🏖️", code: "B02010500" },
];

const EXTENDED_CODES: &[(&str, &str)] = &[
    ("B02010600", "유스호스텔"),
    ("B02011000", "호스텔"),
    ("B02011200", "민박"),
    ("B02011300", "휴양콘도"),
    ("A02010400", "관광지"),
    ("A02020200", "문화시설"),
];

// Resolve a filter label to the code sent to the listing source.
//
// `None` means "omit the category filter": the all-categories label and blank
// labels both land here. Unmapped labels are passed through unchanged.
pub fn code_for(label: &str) -> Option<String> {
    let label = label.trim();
    if label.is_empty() || label == ALL_LABEL || label.eq_ignore_ascii_case("ALL") {
        return None;
    }

    let code = CATEGORIES
        .iter()
        .find(|category| category.label == label)
        .map(|category| category.code)
        .unwrap_or(label);
    Some(code.to_string())
}

// Display label for a code found on a record; unknown codes come back as-is
pub fn label_for(code: &str) -> &str {
    CATEGORIES
        .iter()
        .find(|category| category.code == code)
        .map(|category| category.label)
        .or_else(|| {
            EXTENDED_CODES
                .iter()
                .find(|(known, _)| *known == code)
                .map(|(_, label)| *label)
        })
        .unwrap_or(code)
}
