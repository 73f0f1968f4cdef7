use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::error::FaqError;
use crate::store::types::MetadataFilter;

/// Selector value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "All";

/// Metadata key records are tagged with.
pub const CATEGORY_KEY: &str = "category";

const STOCK_CATEGORIES: &[&str] = &[
    "Trading Strategies",
    "Trading Strategy",
    "Trading Basics",
    "Trading Concepts",
    "Trading Tools",
    "Trading Options",
    "Technical Analysis",
    "Fundamental Analysis",
    "Market Indicators",
    "Market Structure",
    "Market Function",
    "Market Theory",
    "Market Benchmarks",
    "Market Cycles",
    "Market Anomalies",
    "Risk Management",
    "Order Types",
    "Brokerage Accounts",
    "Options Strategy",
    "Portfolio Management",
    "Investment Options",
    "Investment Types",
    "Company Analysis",
    "Financial Metrics",
    "Price Metrics",
    "Earnings Analysis",
    "Economic Impact",
    "Industry Basics",
    "Corporate Finance",
    "Derivatives",
    "Dividend Types",
    "International Investing",
    "International Risk",
    "International Access",
    "Account Types",
    "Advanced Trading",
    "Advanced Strategy",
    "Advanced Risk",
    "High-Risk Investing",
    "Employee Benefits",
    "Tax Rules",
    "Wealth Building",
    "Research Tools",
    "Analysis Methods",
];

const STOCK_EXAMPLES: &[&str] = &[
    "What is a bond?",
    "What is technical analysis?",
    "What is risk management?",
];

const SUPPORT_CATEGORIES: &[&str] = &[
    "Shipping",
    "Returns",
    "Payments",
    "Orders",
    "Account",
    "Product Information",
    "Privacy & Security",
    "Customer Support",
];

const SUPPORT_EXAMPLES: &[&str] = &[
    "What are your shipping options?",
    "How do I return an item?",
    "Which payment methods do you accept?",
];

/// Which FAQ dataset the deployment serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FaqDomain {
    Stock,
    Support,
}

impl FromStr for FaqDomain {
    type Err = FaqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stock" | "trading" => Ok(FaqDomain::Stock),
            "support" | "customer-support" => Ok(FaqDomain::Support),
            other => Err(FaqError::Configuration(format!(
                "unknown FAQ_DOMAIN `{}` (expected `stock` or `support`)",
                other
            ))),
        }
    }
}

/// Category enumeration and example questions for one FAQ domain.
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub domain: FaqDomain,
    pub title: &'static str,
    pub description: &'static str,
    pub placeholder: &'static str,
    pub categories: &'static [&'static str],
    pub examples: &'static [&'static str],
}

impl Catalog {
    pub fn for_domain(domain: FaqDomain) -> Self {
        match domain {
            FaqDomain::Stock => Self {
                domain,
                title: "Stock Trading FAQ Assistant",
                description: "Find answers to common stock trading questions using natural language. \
                              Filter by category to find specific trading-related information.",
                placeholder: "e.g., What is a stock?",
                categories: STOCK_CATEGORIES,
                examples: STOCK_EXAMPLES,
            },
            FaqDomain::Support => Self {
                domain,
                title: "Customer Support FAQ Assistant",
                description: "Find answers to common customer support questions using natural language. \
                              Filter by category to narrow the search.",
                placeholder: "e.g., How long does shipping take?",
                categories: SUPPORT_CATEGORIES,
                examples: SUPPORT_EXAMPLES,
            },
        }
    }

    /// Resolve a category case-insensitively to its canonical spelling.
    pub fn resolve(&self, category: &str) -> Option<&'static str> {
        let wanted = category.trim();
        self.categories
            .iter()
            .copied()
            .find(|c| c.eq_ignore_ascii_case(wanted))
    }

    /// Translate a selector value into an optional metadata filter.
    /// Blank and "All" mean no filter; anything else must be a known category.
    pub fn category_filter(&self, selection: Option<&str>) -> Result<Option<MetadataFilter>, FaqError> {
        let Some(selection) = selection.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        if selection.eq_ignore_ascii_case(ALL_CATEGORIES) {
            return Ok(None);
        }
        let canonical = self
            .resolve(selection)
            .ok_or_else(|| FaqError::InvalidQuery(format!("unknown category `{}`", selection)))?;
        Ok(Some(MetadataFilter::new(
            CATEGORY_KEY,
            Value::String(canonical.to_string()),
        )))
    }

    /// Categories as offered by the selector, "All" first.
    pub fn selector_options(&self) -> Vec<&'static str> {
        std::iter::once(ALL_CATEGORIES)
            .chain(self.categories.iter().copied())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_and_blank_mean_no_filter() {
        let catalog = Catalog::for_domain(FaqDomain::Stock);
        assert!(catalog.category_filter(None).unwrap().is_none());
        assert!(catalog.category_filter(Some("  ")).unwrap().is_none());
        assert!(catalog.category_filter(Some("all")).unwrap().is_none());
    }

    #[test]
    fn known_category_becomes_canonical_filter() {
        let catalog = Catalog::for_domain(FaqDomain::Support);
        let filter = catalog.category_filter(Some("shipping")).unwrap().unwrap();
        assert_eq!(filter.key, CATEGORY_KEY);
        assert_eq!(filter.value, Value::String("Shipping".into()));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let catalog = Catalog::for_domain(FaqDomain::Stock);
        let err = catalog.category_filter(Some("Shipping")).unwrap_err();
        assert!(matches!(err, FaqError::InvalidQuery(_)));
    }

    #[test]
    fn selector_lists_all_first() {
        let catalog = Catalog::for_domain(FaqDomain::Stock);
        let options = catalog.selector_options();
        assert_eq!(options[0], ALL_CATEGORIES);
        assert_eq!(options.len(), STOCK_CATEGORIES.len() + 1);
    }

    #[test]
    fn domain_parses_aliases() {
        assert_eq!("Trading".parse::<FaqDomain>().unwrap(), FaqDomain::Stock);
        assert_eq!("support".parse::<FaqDomain>().unwrap(), FaqDomain::Support);
        assert!("weather".parse::<FaqDomain>().is_err());
    }
}
