use crate::model::Position;
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/// Committed filter values. Empty strings, an empty position list and
/// `false` all mean "no constraint on this facet".
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    pub search_query: String,
    pub selected_brand: String,
    pub selected_model: String,
    pub selected_year: String,
    pub selected_positions: Vec<Position>,
    pub oem_reference: String,
    pub fmsi_reference: String,
    pub width: String,
    pub height: String,
    pub show_favorites_only: bool,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum FacetKey {
    SearchQuery,
    SelectedBrand,
    SelectedModel,
    SelectedYear,
    SelectedPositions,
    OemReference,
    FmsiReference,
    Width,
    Height,
    ShowFavoritesOnly,
}

impl FacetKey {
    pub const ALL: [FacetKey; 10] = [
        FacetKey::SearchQuery,
        FacetKey::SelectedBrand,
        FacetKey::SelectedModel,
        FacetKey::SelectedYear,
        FacetKey::SelectedPositions,
        FacetKey::OemReference,
        FacetKey::FmsiReference,
        FacetKey::Width,
        FacetKey::Height,
        FacetKey::ShowFavoritesOnly,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FacetKey::SearchQuery => "searchQuery",
            FacetKey::SelectedBrand => "selectedBrand",
            FacetKey::SelectedModel => "selectedModel",
            FacetKey::SelectedYear => "selectedYear",
            FacetKey::SelectedPositions => "selectedPositions",
            FacetKey::OemReference => "oemReference",
            FacetKey::FmsiReference => "fmsiReference",
            FacetKey::Width => "width",
            FacetKey::Height => "height",
            FacetKey::ShowFavoritesOnly => "showFavoritesOnly",
        }
    }
}

impl fmt::Display for FacetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Facets edited through free text, the ones that go through a debounced
/// draft before reaching the store.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TextFacet {
    Query,
    Brand,
    Model,
    Year,
    Oem,
    Fmsi,
    Width,
    Height,
}

impl TextFacet {
    pub const ALL: [TextFacet; 8] = [
        TextFacet::Query,
        TextFacet::Brand,
        TextFacet::Model,
        TextFacet::Year,
        TextFacet::Oem,
        TextFacet::Fmsi,
        TextFacet::Width,
        TextFacet::Height,
    ];

    pub fn key(self) -> FacetKey {
        match self {
            TextFacet::Query => FacetKey::SearchQuery,
            TextFacet::Brand => FacetKey::SelectedBrand,
            TextFacet::Model => FacetKey::SelectedModel,
            TextFacet::Year => FacetKey::SelectedYear,
            TextFacet::Oem => FacetKey::OemReference,
            TextFacet::Fmsi => FacetKey::FmsiReference,
            TextFacet::Width => FacetKey::Width,
            TextFacet::Height => FacetKey::Height,
        }
    }
}

/// Borrowed view of one facet's value, handed to a strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterValue<'a> {
    Text(&'a str),
    Positions(&'a [Position]),
    Flag(bool),
}

impl FilterValue<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            FilterValue::Text(text) => text.trim().is_empty(),
            FilterValue::Positions(positions) => positions.is_empty(),
            FilterValue::Flag(flag) => !flag,
        }
    }
}

impl FilterState {
    pub fn value(&self, key: FacetKey) -> FilterValue<'_> {
        match key {
            FacetKey::SearchQuery => FilterValue::Text(&self.search_query),
            FacetKey::SelectedBrand => FilterValue::Text(&self.selected_brand),
            FacetKey::SelectedModel => FilterValue::Text(&self.selected_model),
            FacetKey::SelectedYear => FilterValue::Text(&self.selected_year),
            FacetKey::SelectedPositions => FilterValue::Positions(&self.selected_positions),
            FacetKey::OemReference => FilterValue::Text(&self.oem_reference),
            FacetKey::FmsiReference => FilterValue::Text(&self.fmsi_reference),
            FacetKey::Width => FilterValue::Text(&self.width),
            FacetKey::Height => FilterValue::Text(&self.height),
            FacetKey::ShowFavoritesOnly => FilterValue::Flag(self.show_favorites_only),
        }
    }

    pub fn text(&self, facet: TextFacet) -> &str {
        match self.value(facet.key()) {
            FilterValue::Text(text) => text,
            FilterValue::Positions(_) | FilterValue::Flag(_) => "",
        }
    }

    pub fn is_active(&self, key: FacetKey) -> bool {
        !self.value(key).is_empty()
    }

    /// True when any facet other than the favorites toggle constrains results.
    pub fn has_search_criteria(&self) -> bool {
        FacetKey::ALL
            .iter()
            .filter(|key| **key != FacetKey::ShowFavoritesOnly)
            .any(|key| self.is_active(*key))
    }

    pub fn active_facets(&self) -> Vec<FacetKey> {
        FacetKey::ALL
            .iter()
            .copied()
            .filter(|key| self.is_active(*key))
            .collect()
    }

    pub fn is_cleared(&self) -> bool {
        *self == FilterState::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_constrain_nothing() {
        let state = FilterState::default();
        assert!(state.active_facets().is_empty());
        assert!(!state.has_search_criteria());
        assert!(state.is_cleared());
    }

    #[test]
    fn whitespace_text_is_inactive() {
        let state = FilterState {
            search_query: "   ".to_string(),
            ..Default::default()
        };
        assert!(!state.is_active(FacetKey::SearchQuery));
    }

    #[test]
    fn favorites_toggle_alone_is_not_search_criteria() {
        let state = FilterState {
            show_favorites_only: true,
            ..Default::default()
        };
        assert_eq!(state.active_facets(), vec![FacetKey::ShowFavoritesOnly]);
        assert!(!state.has_search_criteria());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let state = FilterState {
            selected_brand: "ford".to_string(),
            selected_positions: vec![Position::Front],
            ..Default::default()
        };
        let value = serde_json::to_value(&state).expect("serialize state");
        assert_eq!(value["selectedBrand"], "ford");
        assert_eq!(value["selectedPositions"][0], "delantera");
        assert_eq!(value["showFavoritesOnly"], false);
    }

    #[test]
    fn text_facets_map_to_text_values() {
        let state = FilterState {
            width: "98".to_string(),
            ..Default::default()
        };
        assert_eq!(state.text(TextFacet::Width), "98");
        for facet in TextFacet::ALL {
            assert!(matches!(state.value(facet.key()), FilterValue::Text(_)));
        }
    }
}
