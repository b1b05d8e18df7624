//! Rate API profiles: endpoint templates and response shapes.
//!
//! Each profile names a primary and a fallback endpoint (templates with
//! `{date}`, `{from}`, `{to}` and `{api_key}` placeholders), a helper link to
//! the provider's supported-currency list, and the shape its responses come
//! in. Shape extraction is a tagged variant so the fetch path never branches
//! on the selected profile.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::cache::RateTable;
use crate::error::{ConvertError, ConvertResult};

const DEFAULT_CONVERSION_LINK: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@{date}/v1/currencies/{from}.min.json";
const DEFAULT_FALLBACK_LINK: &str =
    "https://{date}.currency-api.pages.dev/v1/currencies/{from}.min.json";
const DEFAULT_HELPER_LINK: &str =
    "https://cdn.jsdelivr.net/npm/@fawazahmed0/currency-api@latest/v1/currencies.json";

const EXCHANGE_RATE_API_LINK: &str = "https://v6.exchangerate-api.com/v6/{api_key}/{date}/{from}";
const EXCHANGE_RATE_API_HELPER_LINK: &str =
    "https://www.exchangerate-api.com/docs/supported-currencies";

const CURRENCY_API_LINK: &str =
    "https://api.currencyapi.com/v3/{date}?apikey={api_key}&base_currency={from}";
const CURRENCY_API_HELPER_LINK: &str = "https://currencyapi.com/docs/currency-list";

/// How a provider lays out the rate table inside its JSON response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseShape {
    /// Flat map of target-code → rate under a root field named after the
    /// base code: `{"usd": {"eur": 0.92, ...}}`.
    BaseKeyed,
    /// Flat map of target-code → rate under a fixed field, e.g.
    /// `{"conversion_rates": {"EUR": 0.92, ...}}`.
    NestedField(String),
    /// Per-entry objects with `code`/`value` fields under a fixed field:
    /// `{"data": {"EUR": {"code": "EUR", "value": 0.92}, ...}}`.
    CodeValue(String),
}

impl ResponseShape {
    /// Pull the rate table for `from` out of a raw response body. Codes are
    /// normalized to lowercase.
    pub fn extract(&self, root: &Value, from: &str) -> ConvertResult<RateTable> {
        let field = match self {
            ResponseShape::BaseKeyed => from,
            ResponseShape::NestedField(field) | ResponseShape::CodeValue(field) => field,
        };
        let entries = root
            .get(field)
            .and_then(Value::as_object)
            .ok_or_else(|| ConvertError::FetchFailed(format!("missing '{field}' in response")))?;

        let mut rates: RateTable = HashMap::with_capacity(entries.len());
        for (key, value) in entries {
            match self {
                ResponseShape::BaseKeyed | ResponseShape::NestedField(_) => {
                    rates.insert(key.to_lowercase(), decimal_value(value)?);
                }
                ResponseShape::CodeValue(_) => {
                    let code = value.get("code").and_then(Value::as_str).ok_or_else(|| {
                        ConvertError::FetchFailed("missing 'code' in rate entry".to_string())
                    })?;
                    let rate = value.get("value").ok_or_else(|| {
                        ConvertError::FetchFailed("missing 'value' in rate entry".to_string())
                    })?;
                    rates.insert(code.to_lowercase(), decimal_value(rate)?);
                }
            }
        }
        Ok(rates)
    }
}

/// Rates arrive as exact decimal text (serde_json keeps arbitrary precision);
/// routing them through binary floats would corrupt the displayed digits.
fn decimal_value(value: &Value) -> ConvertResult<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => {
            return Err(ConvertError::FetchFailed(
                "non-numeric rate in response".to_string(),
            ))
        }
    };
    text.parse()
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| ConvertError::FetchFailed(format!("unparseable rate '{text}'")))
}

/// Endpoint templates for a user-supplied rate source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomEndpoints {
    /// Primary endpoint template.
    pub conversion_link: String,
    /// Fallback endpoint template.
    pub fallback_link: String,
    /// Link to the source's supported-currency list.
    pub helper_link: String,
    /// Shape of the source's responses.
    pub shape: ResponseShape,
}

/// A supported rate API.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ApiProfile {
    /// fawazahmed0 currency-api via jsDelivr, with a pages.dev fallback.
    /// Keyless.
    #[default]
    Default,
    /// exchangerate-api.com v6. Requires an API key.
    ExchangeRateApi,
    /// currencyapi.com v3. Requires an API key.
    CurrencyApi,
    /// User-supplied endpoints.
    Custom(CustomEndpoints),
}

impl ApiProfile {
    /// Whether this profile needs an API key to work.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, ApiProfile::ExchangeRateApi | ApiProfile::CurrencyApi)
    }

    /// The response shape this profile's endpoints produce.
    pub fn shape(&self) -> ResponseShape {
        match self {
            ApiProfile::Default => ResponseShape::BaseKeyed,
            ApiProfile::ExchangeRateApi => ResponseShape::NestedField("conversion_rates".to_string()),
            ApiProfile::CurrencyApi => ResponseShape::CodeValue("data".to_string()),
            ApiProfile::Custom(custom) => custom.shape.clone(),
        }
    }

    /// Primary endpoint URL for a base currency.
    pub fn conversion_url(&self, from: &str, to: &str, date: &str, api_key: &str) -> String {
        self.render(self.conversion_template(), from, to, date, api_key)
    }

    /// Fallback endpoint URL for a base currency.
    pub fn fallback_url(&self, from: &str, to: &str, date: &str, api_key: &str) -> String {
        self.render(self.fallback_template(), from, to, date, api_key)
    }

    /// Link to the profile's supported-currency list, shown with warning
    /// results.
    pub fn helper_link(&self) -> &str {
        match self {
            ApiProfile::Default => DEFAULT_HELPER_LINK,
            ApiProfile::ExchangeRateApi => EXCHANGE_RATE_API_HELPER_LINK,
            ApiProfile::CurrencyApi => CURRENCY_API_HELPER_LINK,
            ApiProfile::Custom(custom) => &custom.helper_link,
        }
    }

    fn conversion_template(&self) -> &str {
        match self {
            ApiProfile::Default => DEFAULT_CONVERSION_LINK,
            ApiProfile::ExchangeRateApi => EXCHANGE_RATE_API_LINK,
            ApiProfile::CurrencyApi => CURRENCY_API_LINK,
            ApiProfile::Custom(custom) => &custom.conversion_link,
        }
    }

    fn fallback_template(&self) -> &str {
        match self {
            ApiProfile::Default => DEFAULT_FALLBACK_LINK,
            // These providers have no secondary host; retry the same one.
            ApiProfile::ExchangeRateApi => EXCHANGE_RATE_API_LINK,
            ApiProfile::CurrencyApi => CURRENCY_API_LINK,
            ApiProfile::Custom(custom) => &custom.fallback_link,
        }
    }

    fn render(&self, template: &str, from: &str, to: &str, date: &str, api_key: &str) -> String {
        // currencyapi.com expects the base code uppercased in the URL.
        let from = if matches!(self, ApiProfile::CurrencyApi) {
            from.to_uppercase()
        } else {
            from.to_string()
        };
        template
            .replace("{date}", date)
            .replace("{from}", &from)
            .replace("{to}", to)
            .replace("{api_key}", api_key)
    }
}
