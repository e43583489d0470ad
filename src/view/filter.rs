use crate::model::item::{Category, Flag, Item};
use crate::util::collate;

/// Category facet of a view: exact match, or no constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Confirmed,
    Unverified,
}

impl CategoryFilter {
    pub fn parse(s: &str) -> Option<CategoryFilter> {
        match s {
            "all" => Some(CategoryFilter::All),
            "confirmed" => Some(CategoryFilter::Confirmed),
            "unverified" => Some(CategoryFilter::Unverified),
            _ => None,
        }
    }

    fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Confirmed => category == Category::Confirmed,
            CategoryFilter::Unverified => category == Category::Unverified,
        }
    }
}

/// A view request: every constraint is AND-ed. An empty spec passes
/// everything.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub category: CategoryFilter,
    /// Flags that must be true. A flag that doesn't apply to the item's
    /// kind reads as false, so requiring it filters those items out.
    pub require: Vec<Flag>,
    /// Case-insensitive substring match over the item's text fields and
    /// active flag labels.
    pub query: String,
}

/// The searchable text of an item: every free-text field plus the labels
/// of flags that are set, so "wanted" or "cib" work as queries.
fn haystack(item: &Item) -> String {
    let mut s = format!(
        "{} {} {} {} {} {}",
        item.title,
        item.code,
        item.variant,
        item.sources,
        item.notes,
        item.category.as_str()
    );
    for flag in [Flag::Cart, Flag::Manual, Flag::Box, Flag::Wanted, Flag::Owned] {
        if item.flag(flag) {
            s.push(' ');
            s.push_str(flag.key());
        }
    }
    if item.is_complete() {
        s.push_str(" cib");
    }
    let cond = item.display_condition().as_str();
    if !cond.is_empty() {
        s.push(' ');
        s.push_str(cond);
    }
    s
}

/// Project the store's list through a filter, sorted by title with
/// Norwegian collation. The store's insertion order never leaks into a
/// view.
pub fn filter<'a>(items: &'a [Item], spec: &FilterSpec) -> Vec<&'a Item> {
    let query = spec.query.trim().to_lowercase();
    let mut out: Vec<&Item> = items
        .iter()
        .filter(|item| spec.category.matches(item.category))
        .filter(|item| spec.require.iter().all(|&f| item.flag(f)))
        .filter(|item| query.is_empty() || haystack(item).to_lowercase().contains(&query))
        .collect();
    out.sort_by(|a, b| collate::compare(&a.title, &b.title));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::item::{Details, Kind};

    fn game(title: &str, category: Category, cart: bool, wanted: bool) -> Item {
        let mut item = Item::new(Kind::Games, title.to_string());
        item.category = category;
        item.wanted = wanted;
        item.details = Details::Game {
            cart,
            manual: false,
            boxed: false,
        };
        item
    }

    #[test]
    fn test_empty_spec_passes_all_sorted() {
        let items = vec![
            game("Zelda", Category::Confirmed, false, false),
            game("Asterix", Category::Unverified, false, false),
        ];
        let view = filter(&items, &FilterSpec::default());
        let titles: Vec<_> = view.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Asterix", "Zelda"]);
    }

    #[test]
    fn test_category_filter() {
        let items = vec![
            game("A", Category::Confirmed, false, false),
            game("B", Category::Unverified, false, false),
        ];
        let spec = FilterSpec {
            category: CategoryFilter::Unverified,
            ..Default::default()
        };
        let view = filter(&items, &spec);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].title, "B");
    }

    #[test]
    fn test_required_flags_are_anded() {
        let items = vec![
            game("A", Category::Confirmed, true, false),
            game("B", Category::Confirmed, true, true),
        ];
        let spec = FilterSpec {
            require: vec![Flag::Cart, Flag::Wanted],
            ..Default::default()
        };
        let view = filter(&items, &spec);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].title, "B");
    }

    #[test]
    fn test_query_matches_text_and_flag_labels() {
        let mut a = game("Mega Man", Category::Confirmed, false, false);
        a.notes = "kjøpt på Finn".to_string();
        let b = game("Contra", Category::Confirmed, false, true);
        let items = vec![a, b];

        let spec = FilterSpec {
            query: "FINN".to_string(),
            ..Default::default()
        };
        assert_eq!(filter(&items, &spec)[0].title, "Mega Man");

        let spec = FilterSpec {
            query: "wanted".to_string(),
            ..Default::default()
        };
        assert_eq!(filter(&items, &spec)[0].title, "Contra");
    }

    #[test]
    fn test_query_matches_cib() {
        let mut a = game("Kirby", Category::Confirmed, true, false);
        a.details = Details::Game {
            cart: true,
            manual: true,
            boxed: true,
        };
        let b = game("Contra", Category::Confirmed, true, false);
        let items = vec![a, b];
        let spec = FilterSpec {
            query: "cib".to_string(),
            ..Default::default()
        };
        let view = filter(&items, &spec);
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].title, "Kirby");
    }

    #[test]
    fn test_requiring_owned_on_games_matches_nothing() {
        let items = vec![game("A", Category::Confirmed, true, false)];
        let spec = FilterSpec {
            require: vec![Flag::Owned],
            ..Default::default()
        };
        assert!(filter(&items, &spec).is_empty());
    }
}
