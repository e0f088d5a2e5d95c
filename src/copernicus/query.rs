use crate::config::Period;
use crate::geometry::AreaOfInterest;
use std::collections::BTreeMap;
use url::Url;

/// Upper bound the OData API accepts for `$top`.
pub const PAGE_SIZE: u32 = 1000;

/// A product search against the OData `Products` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueQuery {
    filter: String,
}

impl CatalogueQuery {
    /// Products of `collection` whose footprint intersects `area` and whose sensing start lies
    /// in `[period.start, period.end)`, carrying every string attribute in `attributes`.
    pub fn build(
        collection: &str,
        area: &AreaOfInterest,
        period: &Period,
        attributes: &BTreeMap<String, String>,
    ) -> Self {
        let mut clauses = vec![
            format!("Collection/Name eq {}", literal(collection)),
            format!(
                "OData.CSC.Intersects(area=geography{})",
                literal(&format!("SRID=4326;{}", area.wkt()))
            ),
            format!("ContentDate/Start ge {}T00:00:00.000Z", period.start),
            format!("ContentDate/Start lt {}T00:00:00.000Z", period.end),
        ];

        for (name, value) in attributes {
            clauses.push(format!(
                "Attributes/OData.CSC.StringAttribute/any(att:att/Name eq {} and att/OData.CSC.StringAttribute/Value eq {})",
                literal(name),
                literal(value)
            ));
        }

        Self {
            filter: clauses.join(" and "),
        }
    }

    pub fn filter(self: &Self) -> &str {
        &self.filter
    }

    /// Attach the filter and the result shaping options to the catalogue endpoint.
    pub fn to_url(self: &Self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        url.query_pairs_mut()
            .append_pair("$filter", &self.filter)
            .append_pair("$count", "True")
            .append_pair("$top", &PAGE_SIZE.to_string())
            .append_pair("$expand", "Attributes");
        url
    }
}

/// OData string literal; embedded quotes are doubled.
fn literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
