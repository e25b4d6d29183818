//! Dashboard configuration: which fields each view reads, and the defaults it starts with.

use std::{fmt::Display, num::NonZeroU32, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Error,
    aggregation::Period,
    field::FieldMap,
    filter::FilterCriteria,
    pagination::PageState,
    series::ColorPalette,
};

/// The views the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKey {
    /// Wallet balances per currency.
    Balances,
    /// Collection and payment history.
    Transactions,
    /// Payouts to bank accounts and wallets.
    Transfers,
    /// API keys issued to the business.
    ApiKeys,
    /// Registered SMS sender IDs.
    SenderIds,
    /// Virtual card holders.
    Cardholders,
    /// Audit and webhook events.
    Events,
    /// The analytics view of money moving in and out of the wallet.
    WalletFlows,
}

impl ViewKey {
    /// Every view, in navigation order.
    pub const ALL: [ViewKey; 8] = [
        Self::Balances,
        Self::Transactions,
        Self::Transfers,
        Self::ApiKeys,
        Self::SenderIds,
        Self::Cardholders,
        Self::Events,
        Self::WalletFlows,
    ];

    /// The kebab-case name used in config files, file names and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Balances => "balances",
            Self::Transactions => "transactions",
            Self::Transfers => "transfers",
            Self::ApiKeys => "api-keys",
            Self::SenderIds => "sender-ids",
            Self::Cardholders => "cardholders",
            Self::Events => "events",
            Self::WalletFlows => "wallet-flows",
        }
    }
}

impl Display for ViewKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::UnknownView(s.to_owned()))
    }
}

/// The config for pagination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// The zero-based page to start on.
    pub default_page: usize,
    /// The number of rows per page when the user has not picked one.
    pub default_page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 0,
            default_page_size: 20,
        }
    }
}

impl PaginationConfig {
    /// The page state a table view starts in.
    ///
    /// # Errors
    /// Returns [Error::InvalidPageSize] if `default_page_size` is zero.
    pub fn initial_state(&self) -> Result<PageState, Error> {
        let mut state = PageState::new(self.default_page_size)?;
        state.set_page(self.default_page);
        Ok(state)
    }
}

/// The date window a view opens with unless configured otherwise.
pub const DEFAULT_WINDOW_DAYS: NonZeroU32 = NonZeroU32::new(30).unwrap();

fn default_window_days() -> NonZeroU32 {
    DEFAULT_WINDOW_DAYS
}

/// How one view reads its records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// The view this config applies to.
    pub key: ViewKey,
    /// The fields the view searches, filters, dates, sums and groups by.
    pub fields: FieldMap,
    /// The date window the view opens with.
    #[serde(default = "default_window_days")]
    pub default_window_days: NonZeroU32,
    /// The category given the accent color in charts. Only used by analytics views.
    #[serde(default)]
    pub primary_category: Option<String>,
    /// The bucketing period charts open with. Only used by analytics views.
    #[serde(default)]
    pub default_period: Option<Period>,
}

impl ViewConfig {
    fn new(key: ViewKey, fields: FieldMap) -> Self {
        Self {
            key,
            fields,
            default_window_days: DEFAULT_WINDOW_DAYS,
            primary_category: None,
            default_period: None,
        }
    }

    /// The criteria the view opens with: no search, every status, the default window.
    pub fn initial_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            search_text: String::new(),
            search_fields: self.fields.search.clone(),
            status_field: self.fields.status.clone(),
            status_value: crate::ALL_STATUSES.to_owned(),
            date_field: self.fields.date.clone(),
            window_days: self.default_window_days,
        }
    }

    /// The chart palette, if the view has a primary category.
    pub fn palette(&self) -> Option<ColorPalette> {
        self.primary_category
            .as_deref()
            .map(ColorPalette::new)
    }
}

/// The configuration for the whole dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// The canonical timezone calendar dates are taken in, e.g. "Africa/Lagos".
    pub timezone: String,
    /// Page defaults shared by every table view.
    pub pagination: PaginationConfig,
    /// How many recomputed results each view keeps cached.
    pub cache_capacity: usize,
    /// Per-view settings.
    pub views: Vec<ViewConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_owned(),
            pagination: PaginationConfig::default(),
            cache_capacity: 16,
            views: default_views(),
        }
    }
}

impl DashboardConfig {
    /// Parse a config from JSON. Omitted top-level keys take their defaults.
    ///
    /// # Errors
    /// Returns [Error::ConfigParse] if the JSON is malformed or a field path is invalid.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|error| Error::ConfigParse(error.to_string()))
    }

    /// Read and parse a JSON config file.
    ///
    /// # Errors
    /// Returns [Error::ConfigRead] if the file cannot be read, or
    /// [Error::ConfigParse] if its contents are not a valid config.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)
            .map_err(|error| Error::ConfigRead(path.display().to_string(), error.to_string()))?;

        let config = Self::from_json(&json)?;
        tracing::debug!(
            "loaded config from {} with {} views",
            path.display(),
            config.views.len()
        );

        Ok(config)
    }

    /// The settings for `key`.
    ///
    /// # Errors
    /// Returns [Error::UnknownView] if the config has no entry for the view.
    pub fn view(&self, key: ViewKey) -> Result<&ViewConfig, Error> {
        self.views
            .iter()
            .find(|view| view.key == key)
            .ok_or_else(|| Error::UnknownView(key.to_string()))
    }
}

fn default_views() -> Vec<ViewConfig> {
    let field_maps = [
        (
            ViewKey::Balances,
            FieldMap::new(
                &["currency", "account_name"],
                None,
                "updated_at",
                Some("available"),
                Some("currency"),
            ),
        ),
        (
            ViewKey::Transactions,
            FieldMap::new(
                &["reference", "description", "customer.name", "customer.email"],
                Some("status"),
                "created_at",
                Some("amount"),
                Some("type"),
            ),
        ),
        (
            ViewKey::Transfers,
            FieldMap::new(
                &["reference", "recipient.account_name", "recipient.bank_name"],
                Some("status"),
                "created_at",
                Some("amount"),
                Some("type"),
            ),
        ),
        (
            ViewKey::ApiKeys,
            FieldMap::new(
                &["name", "prefix"],
                Some("is_active"),
                "created_at",
                None,
                None,
            ),
        ),
        (
            ViewKey::SenderIds,
            FieldMap::new(
                &["sender_id", "company_name", "use_case"],
                Some("status"),
                "created_at",
                None,
                None,
            ),
        ),
        (
            ViewKey::Cardholders,
            FieldMap::new(
                &["first_name", "last_name", "email", "phone"],
                Some("status"),
                "created_at",
                None,
                None,
            ),
        ),
        (
            ViewKey::Events,
            FieldMap::new(
                &["event", "description", "actor.email"],
                Some("event"),
                "timestamp",
                None,
                None,
            ),
        ),
        (
            ViewKey::WalletFlows,
            FieldMap::new(
                &["reference", "description"],
                Some("status"),
                "created_at",
                Some("amount"),
                Some("type"),
            ),
        ),
    ];

    field_maps
        .into_iter()
        .filter_map(|(key, fields)| match fields {
            Ok(fields) => Some(ViewConfig::new(key, fields)),
            Err(error) => {
                tracing::warn!("skipping built-in view {key}: {error}");
                None
            }
        })
        .map(|mut view| {
            if view.key == ViewKey::WalletFlows {
                view.primary_category = Some("wallet_cashin".to_owned());
                view.default_period = Some(Period::Daily);
            }
            view
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::{io::Write, num::NonZeroU32};

    use crate::{Error, aggregation::Period, pagination::PageRequest};

    use super::{DashboardConfig, PaginationConfig, ViewKey};

    #[test]
    fn default_config_covers_every_view() {
        let config = DashboardConfig::default();

        for key in ViewKey::ALL {
            let view = config.view(key).unwrap_or_else(|_| panic!("missing default view {key}"));
            assert_eq!(view.default_window_days.get(), 30);
        }
    }

    #[test]
    fn wallet_flows_has_chart_defaults() {
        let config = DashboardConfig::default();

        let view = config.view(ViewKey::WalletFlows).unwrap();

        assert_eq!(view.default_period, Some(Period::Daily));
        assert_eq!(
            view.palette().unwrap().primary_category,
            "wallet_cashin".to_owned()
        );
    }

    #[test]
    fn view_keys_round_trip_through_names() {
        for key in ViewKey::ALL {
            assert_eq!(key.as_str().parse::<ViewKey>(), Ok(key));
        }
        assert_eq!(
            "wallets".parse::<ViewKey>(),
            Err(Error::UnknownView("wallets".to_owned()))
        );
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let json = r#"{
            "timezone": "Africa/Lagos",
            "views": [{
                "key": "events",
                "fields": {"search": ["event"], "date": "occurred_at"},
                "default_window_days": 7
            }]
        }"#;

        let got = DashboardConfig::from_json(json).unwrap();

        assert_eq!(got.timezone, "Africa/Lagos");
        assert_eq!(got.pagination, PaginationConfig::default());
        assert_eq!(got.views.len(), 1);
        let events = got.view(ViewKey::Events).unwrap();
        assert_eq!(events.default_window_days, NonZeroU32::new(7).unwrap());
        assert_eq!(events.fields.date.as_str(), "occurred_at");
        assert_eq!(
            got.view(ViewKey::Transfers).unwrap_err(),
            Error::UnknownView("transfers".to_owned())
        );
    }

    #[test]
    fn zero_window_is_rejected() {
        let json = r#"{
            "views": [{"key": "events", "fields": {"date": "t"}, "default_window_days": 0}]
        }"#;

        let got = DashboardConfig::from_json(json);

        assert!(matches!(got, Err(Error::ConfigParse(_))));
    }

    #[test]
    fn initial_criteria_match_view_fields() {
        let config = DashboardConfig::default();
        let view = config.view(ViewKey::Transfers).unwrap();

        let got = view.initial_criteria();

        assert_eq!(got.search_fields, view.fields.search);
        assert_eq!(got.status_value, crate::ALL_STATUSES);
        assert_eq!(got.window_days.get(), 30);
    }

    #[test]
    fn initial_page_state_uses_defaults() {
        let pagination = PaginationConfig {
            default_page: 2,
            default_page_size: 50,
        };

        let got = pagination.initial_state().unwrap().request();

        assert_eq!(got, PageRequest::new(2, 50).unwrap());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"cache_capacity": 4}}"#).unwrap();

        let got = DashboardConfig::load(file.path()).unwrap();

        assert_eq!(got.cache_capacity, 4);
        assert_eq!(got.views.len(), ViewKey::ALL.len());
    }

    #[test]
    fn load_reports_missing_file() {
        let got = DashboardConfig::load(std::path::Path::new("/definitely/not/here.json"));

        assert!(matches!(got, Err(Error::ConfigRead(_, _))));
    }
}
