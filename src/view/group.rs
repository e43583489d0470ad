use std::sync::OnceLock;

use regex::Regex;

use crate::model::item::Item;
use crate::util::collate;

/// How the current view is grouped. Chosen per render from the filtered
/// items, so boundaries can shift as the user filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingMode {
    Year,
    Alpha,
}

fn year_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{4})-").expect("static pattern"))
}

fn title_year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:1[89]|20)\d{2}").expect("static pattern"))
}

/// Pick year grouping when enough of the view carries a `YYYY-` code
/// prefix: at least 10 items, and at least 30% of the view. The ratio is
/// compared cross-multiplied so a fractional 30% mark still counts in
/// full.
pub fn detect_mode(items: &[&Item]) -> GroupingMode {
    let coded = items
        .iter()
        .filter(|i| year_prefix_re().is_match(&i.code))
        .count();
    if coded >= 10 && coded * 10 >= items.len() * 3 {
        GroupingMode::Year
    } else {
        GroupingMode::Alpha
    }
}

/// The year bucket for an item, in fallback order: code prefix, a
/// year-like number in the title, an "Album" bucket for album variants,
/// then "Unknown".
fn year_key(item: &Item) -> String {
    if let Some(caps) = year_prefix_re().captures(&item.code) {
        return caps[1].to_string();
    }
    if let Some(m) = title_year_re().find(&item.title) {
        return m.as_str().to_string();
    }
    if item.variant.to_lowercase().contains("album") {
        return "Album".to_string();
    }
    "Unknown".to_string()
}

/// One section of a grouped view.
#[derive(Debug)]
pub struct Group<'a> {
    pub key: String,
    pub items: Vec<&'a Item>,
}

/// Split an already-filtered view into ordered groups. Year mode sorts
/// numeric keys ascending with the named buckets after them; alpha mode
/// sorts letters in collation order with the "#" overflow bucket last.
/// Items inside each group sort by title.
pub fn group<'a>(items: &[&'a Item]) -> (GroupingMode, Vec<Group<'a>>) {
    let mode = detect_mode(items);
    let mut groups: Vec<Group<'a>> = Vec::new();

    for &item in items {
        let key = match mode {
            GroupingMode::Year => year_key(item),
            GroupingMode::Alpha => collate::alpha_bucket(&item.title),
        };
        match groups.iter_mut().find(|g| g.key == key) {
            Some(g) => g.items.push(item),
            None => groups.push(Group {
                key,
                items: vec![item],
            }),
        }
    }

    match mode {
        GroupingMode::Year => groups.sort_by(|a, b| match (a.key.parse::<u32>(), b.key.parse::<u32>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => a.key.cmp(&b.key),
        }),
        GroupingMode::Alpha => groups.sort_by(|a, b| match (a.key.as_str(), b.key.as_str()) {
            ("#", "#") => std::cmp::Ordering::Equal,
            ("#", _) => std::cmp::Ordering::Greater,
            (_, "#") => std::cmp::Ordering::Less,
            (x, y) => collate::compare(x, y),
        }),
    }

    for g in &mut groups {
        g.items.sort_by(|a, b| collate::compare(&a.title, &b.title));
    }

    (mode, groups)
}
