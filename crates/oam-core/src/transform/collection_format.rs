use crate::ir::CollectionFormat;
use crate::parse::parameter::{ParameterLocation, ParameterStyle};

/// Derive the collection format of a parameter from its `(style, explode)`
/// pair.
///
/// In legacy mode an entirely unset pair yields [`CollectionFormat::None`]
/// and an unset `explode` reads as `false`. Previously generated models
/// depend on both.
pub fn collection_format(
    location: ParameterLocation,
    style: Option<ParameterStyle>,
    explode: Option<bool>,
    legacy: bool,
) -> CollectionFormat {
    if legacy && style.is_none() && explode.is_none() {
        return CollectionFormat::None;
    }
    let style = style.unwrap_or(match location {
        ParameterLocation::Query | ParameterLocation::Cookie => ParameterStyle::Form,
        _ => ParameterStyle::Simple,
    });
    let explode = explode.unwrap_or(!legacy && style == ParameterStyle::Form);
    if explode {
        return CollectionFormat::Multi;
    }
    match style {
        ParameterStyle::SpaceDelimited => CollectionFormat::Ssv,
        ParameterStyle::PipeDelimited => CollectionFormat::Pipes,
        ParameterStyle::TabDelimited => CollectionFormat::Tsv,
        _ => CollectionFormat::Csv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::parse::parameter::ParameterLocation::{Header, Path, Query};

    #[test]
    fn legacy_unset_pair_has_no_format() {
        assert_eq!(collection_format(Query, None, None, true), CollectionFormat::None);
        assert_eq!(collection_format(Path, None, None, true), CollectionFormat::None);
    }

    #[test]
    fn legacy_explode_defaults_to_false() {
        assert_eq!(
            collection_format(Query, Some(ParameterStyle::Form), None, true),
            CollectionFormat::Csv
        );
        assert_eq!(
            collection_format(Query, None, Some(true), true),
            CollectionFormat::Multi
        );
    }

    #[test]
    fn documented_defaults() {
        assert_eq!(collection_format(Query, None, None, false), CollectionFormat::Multi);
        assert_eq!(collection_format(Header, None, None, false), CollectionFormat::Csv);
        assert_eq!(
            collection_format(Query, Some(ParameterStyle::Form), Some(false), false),
            CollectionFormat::Csv
        );
    }

    #[test]
    fn delimited_styles() {
        let table = [
            (ParameterStyle::SpaceDelimited, CollectionFormat::Ssv),
            (ParameterStyle::PipeDelimited, CollectionFormat::Pipes),
            (ParameterStyle::TabDelimited, CollectionFormat::Tsv),
            (ParameterStyle::Simple, CollectionFormat::Csv),
            (ParameterStyle::DeepObject, CollectionFormat::Csv),
        ];
        for (style, expected) in table {
            assert_eq!(collection_format(Query, Some(style), Some(false), false), expected);
            assert_eq!(collection_format(Query, Some(style), Some(false), true), expected);
        }
    }
}
