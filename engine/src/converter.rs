//! Query resolution and conversion fan-out.

use std::sync::Arc;

use quickfx_common::{Currency, CurrencyPair};
use rust_decimal::Decimal;
use tracing::{debug, instrument};

use crate::alias::AliasTable;
use crate::cache::RateCache;
use crate::calc;
use crate::config::{ConversionDirection, ConverterConfig};
use crate::error::{ConvertError, ConvertResult};
use crate::format;
use crate::provider::RateProvider;
use crate::query::QueryParser;
use crate::result::{dedup, ConversionResult};

/// A parsed and evaluated conversion request.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    /// Amount to convert.
    pub amount: Decimal,
    /// From-currency token, before alias resolution.
    pub from: Option<String>,
    /// To-currency token, before alias resolution.
    pub to: Option<String>,
    /// Whether this came from an ambient (global) search; affects warning
    /// suppression.
    pub is_global: bool,
}

impl ConversionRequest {
    /// Create a request converting `amount` in every configured direction.
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            from: None,
            to: None,
            is_global: false,
        }
    }

    /// Set the from-currency token.
    pub fn from_currency(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set the to-currency token.
    pub fn to_currency(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Mark the request as coming from an ambient search.
    pub fn global(mut self) -> Self {
        self.is_global = true;
        self
    }
}

/// Everything a spawned per-pair task needs.
struct Shared {
    config: ConverterConfig,
    alias: AliasTable,
    cache: RateCache,
    provider: Arc<dyn RateProvider>,
}

impl Shared {
    /// Cache-or-fetch rate lookup. A fresh cached bucket answers without a
    /// fetch, including the "no such target" answer; a miss fetches and
    /// stores the whole table. Failures are not cached, so the next lookup
    /// retries.
    async fn rate(&self, pair: &CurrencyPair) -> ConvertResult<Decimal> {
        let table = match self.cache.get(&pair.from) {
            Some(table) => table,
            None => {
                let rates = self.provider.fetch_table(pair.from.code()).await?;
                self.cache.insert(&pair.from, rates)
            }
        };

        table
            .get(pair.to.code())
            .copied()
            .ok_or_else(|| ConvertError::UnknownCurrency(pair.to.code().to_string()))
    }

    async fn convert(&self, amount: Decimal, pair: &CurrencyPair) -> ConvertResult<ConversionResult> {
        let rate = self.rate(pair).await?;
        let rendered = format::render(
            amount,
            rate,
            &pair.from,
            &pair.to,
            self.config.precision,
            &self.config.number_format,
        )?;
        Ok(ConversionResult::success(
            pair.clone(),
            amount,
            rendered,
            self.config.output_style,
        ))
    }

    /// One unit of fan-out work. Self-conversions and empty codes are
    /// silently dropped; failures become warning results unless suppressed
    /// by the global-search rule.
    async fn convert_pair(
        self: Arc<Self>,
        amount: Decimal,
        from: String,
        to: String,
        is_global: bool,
    ) -> Option<ConversionResult> {
        let from = Currency::new(self.alias.resolve(&from));
        let to = Currency::new(self.alias.resolve(&to));

        if from == to || from.is_empty() || to.is_empty() {
            return None;
        }

        let pair = CurrencyPair::new(from, to);
        debug!(pair = %pair, "converting");

        match self.convert(amount, &pair).await {
            Ok(result) => Some(result),
            Err(e) => {
                if is_global && !self.config.show_warnings_in_global {
                    None
                } else {
                    Some(ConversionResult::warning(
                        &e,
                        self.config.profile.helper_link(),
                    ))
                }
            }
        }
    }
}

/// The converter: owns the cache, alias table, and provider for its
/// lifetime; constructed once at host init.
pub struct Converter {
    shared: Arc<Shared>,
    parser: QueryParser,
}

impl Converter {
    /// Create a converter. Validates the configuration, compiles the query
    /// grammar, loads the alias table (identity fallback on failure), and
    /// builds an empty cache.
    pub fn new(config: ConverterConfig, provider: Arc<dyn RateProvider>) -> ConvertResult<Self> {
        config.validate()?;
        let parser = QueryParser::new(&config.number_format)?;
        let alias = match &config.alias_path {
            Some(path) => AliasTable::load(path),
            None => AliasTable::empty(),
        };
        let cache = RateCache::with_config(config.cache_config());

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                alias,
                cache,
                provider,
            }),
            parser,
        })
    }

    /// Replace the alias table, for hosts that keep aliases somewhere other
    /// than a file.
    pub fn with_alias_table(mut self, alias: AliasTable) -> Self {
        // The Arc has no other holders until the first query spawns tasks.
        if let Some(shared) = Arc::get_mut(&mut self.shared) {
            shared.alias = alias;
        }
        self
    }

    /// End-to-end query entry point: alias-file health check, parse,
    /// evaluate, fan out, de-duplicate.
    #[instrument(skip(self, query))]
    pub async fn search(&self, query: &str, is_global: bool) -> Vec<ConversionResult> {
        let mut results = Vec::new();

        if let Some(path) = &self.shared.config.alias_path {
            if let Err(e) = AliasTable::validate(path) {
                results.push(ConversionResult::alias_warning(&e));
            }
        }

        let Some(parsed) = self.parser.parse(query) else {
            return dedup(results);
        };

        let amount = match calc::evaluate(
            &parsed.amount_expression,
            &self.shared.config.number_format,
        ) {
            Ok(amount) => amount,
            Err(e) => {
                if !is_global || self.shared.config.show_warnings_in_global {
                    results.push(ConversionResult::invalid_expression(&e));
                }
                return dedup(results);
            }
        };

        let mut request = ConversionRequest::new(amount);
        request.is_global = is_global;
        if !parsed.from.is_empty() {
            request.from = Some(parsed.from);
        }
        if !parsed.to.is_empty() {
            request.to = Some(parsed.to);
        }

        results.extend(self.conversion_results(request).await);
        dedup(results)
    }

    /// Run the fan-out for one request: spawn one task per enumerated pair,
    /// join them all, collect into enumeration order, drop empty slots,
    /// de-duplicate.
    pub async fn conversion_results(&self, request: ConversionRequest) -> Vec<ConversionResult> {
        let pairs = self.enumerate_pairs(&request);
        debug!(pairs = pairs.len(), "enumerated conversions");

        let mut handles = Vec::with_capacity(pairs.len());
        for (from, to) in pairs {
            let shared = Arc::clone(&self.shared);
            handles.push(tokio::spawn(shared.convert_pair(
                request.amount,
                from,
                to,
                request.is_global,
            )));
        }

        // Join in spawn order: each handle is a pre-assigned slot, so the
        // output order is the enumeration order above, not completion order.
        let mut slots: Vec<Option<ConversionResult>> = Vec::with_capacity(handles.len());
        for handle in handles {
            slots.push(handle.await.unwrap_or(None));
        }

        dedup(slots.into_iter().flatten().collect())
    }

    /// Build the (from, to) worklist for one request, in output order.
    fn enumerate_pairs(&self, request: &ConversionRequest) -> Vec<(String, String)> {
        let config = &self.shared.config;
        let local = &config.local_currency;
        let mut pairs = Vec::new();

        match (&request.from, &request.to) {
            (None, _) => {
                for target in &config.target_currencies {
                    pairs.push(match config.direction {
                        ConversionDirection::LocalFirst => (local.clone(), target.clone()),
                        ConversionDirection::TargetFirst => (target.clone(), local.clone()),
                    });
                }
                for target in &config.target_currencies {
                    pairs.push(match config.direction {
                        ConversionDirection::LocalFirst => (target.clone(), local.clone()),
                        ConversionDirection::TargetFirst => (local.clone(), target.clone()),
                    });
                }
            }
            (Some(from), None) => {
                if config.direction == ConversionDirection::LocalFirst {
                    pairs.push((from.clone(), local.clone()));
                }
                for target in &config.target_currencies {
                    pairs.push((from.clone(), target.clone()));
                }
                if config.direction == ConversionDirection::TargetFirst {
                    pairs.push((from.clone(), local.clone()));
                }
            }
            (Some(from), Some(to)) => {
                pairs.push((from.clone(), to.clone()));
            }
        }

        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RateCacheConfig;
    use crate::config::OutputStyle;
    use crate::provider::MockRateProvider;
    use crate::result::Outcome;
    use rust_decimal_macros::dec;

    fn provider() -> Arc<MockRateProvider> {
        let provider = MockRateProvider::new("test");
        provider.set_rate("usd", "eur", dec!(0.92));
        provider.set_rate("usd", "gbp", dec!(0.79));
        provider.set_rate("eur", "usd", dec!(1.09));
        provider.set_rate("eur", "gbp", dec!(0.86));
        provider.set_rate("gbp", "usd", dec!(1.27));
        Arc::new(provider)
    }

    fn config() -> ConverterConfig {
        ConverterConfig {
            local_currency: "usd".to_string(),
            target_currencies: vec!["eur".to_string(), "gbp".to_string()],
            ..Default::default()
        }
    }

    fn converter(provider: Arc<MockRateProvider>, config: ConverterConfig) -> Converter {
        Converter::new(config, provider).unwrap()
    }

    fn subtitles(results: &[ConversionResult]) -> Vec<&str> {
        results.iter().map(|r| r.subtitle.as_str()).collect()
    }

    #[tokio::test]
    async fn test_end_to_end_single_pair() {
        let converter = converter(provider(), config());

        let results = converter.search("100 usd to eur", false).await;

        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.title, "92.00 EUR");
        assert_eq!(result.subtitle, "Currency conversion from USD to EUR");
        assert_eq!(result.outcome, Outcome::Success);

        let conversion = result.conversion.as_ref().unwrap();
        assert_eq!(conversion.compact, "92.00 EUR");
        assert_eq!(conversion.expanded, "100.00 USD = 92.00 EUR");
        assert_eq!(conversion.converted, dec!(92.00));
    }

    #[tokio::test]
    async fn test_expanded_output_style() {
        let config = ConverterConfig {
            output_style: OutputStyle::Expanded,
            ..config()
        };
        let converter = converter(provider(), config);

        let results = converter.search("100 usd to eur", false).await;

        assert_eq!(results[0].title, "100.00 USD = 92.00 EUR");
    }

    #[tokio::test]
    async fn test_cache_idempotence_one_fetch_within_ttl() {
        let provider = provider();
        let converter = converter(Arc::clone(&provider), config());

        converter.search("100 usd to eur", false).await;
        converter.search("200 usd to eur", false).await;
        // Different target, same base bucket: still no new fetch.
        converter.search("100 usd to gbp", false).await;

        assert_eq!(provider.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_cache_expiry_triggers_refetch() {
        let provider = provider();
        let provider_handle: Arc<dyn RateProvider> = provider.clone();
        let converter = Converter {
            shared: Arc::new(Shared {
                config: config(),
                alias: AliasTable::empty(),
                cache: RateCache::with_config(RateCacheConfig {
                    ttl: chrono::Duration::milliseconds(50),
                }),
                provider: provider_handle,
            }),
            parser: QueryParser::new(&config().number_format).unwrap(),
        };

        converter.search("100 usd to eur", false).await;
        tokio::time::sleep(std::time::Duration::from_millis(60)).await;
        converter.search("100 usd to eur", false).await;

        assert_eq!(provider.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_not_cached() {
        let provider = Arc::new(MockRateProvider::new("test"));
        let converter = converter(Arc::clone(&provider), config());

        // Unknown base: every attempt retries the fetch.
        converter.search("100 xyz to eur", false).await;
        converter.search("100 xyz to eur", false).await;

        assert_eq!(provider.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_fan_out_order_is_deterministic_under_latency() {
        let provider = provider();
        // Stagger fetch latency so completion order differs from
        // enumeration order.
        provider.set_delay("usd", 60);
        provider.set_delay("eur", 20);
        let converter = converter(Arc::clone(&provider), config());

        let results = converter.conversion_results(ConversionRequest::new(dec!(100))).await;

        assert_eq!(
            subtitles(&results),
            vec![
                "Currency conversion from USD to EUR",
                "Currency conversion from USD to GBP",
                "Currency conversion from EUR to USD",
                "Currency conversion from GBP to USD",
            ]
        );
    }

    #[tokio::test]
    async fn test_fan_out_target_first_direction() {
        let config = ConverterConfig {
            direction: ConversionDirection::TargetFirst,
            ..config()
        };
        let converter = converter(provider(), config);

        let results = converter.conversion_results(ConversionRequest::new(dec!(100))).await;

        assert_eq!(
            subtitles(&results),
            vec![
                "Currency conversion from EUR to USD",
                "Currency conversion from GBP to USD",
                "Currency conversion from USD to EUR",
                "Currency conversion from USD to GBP",
            ]
        );
    }

    #[tokio::test]
    async fn test_from_only_mode_includes_local() {
        let converter = converter(provider(), config());

        let request = ConversionRequest::new(dec!(50)).from_currency("eur");
        let results = converter.conversion_results(request).await;

        // (eur -> usd) local pair leads, (eur -> eur) self pair is dropped.
        assert_eq!(
            subtitles(&results),
            vec![
                "Currency conversion from EUR to USD",
                "Currency conversion from EUR to GBP",
            ]
        );
    }

    #[tokio::test]
    async fn test_from_only_mode_local_trails_with_target_first() {
        let config = ConverterConfig {
            direction: ConversionDirection::TargetFirst,
            ..config()
        };
        let converter = converter(provider(), config);

        let request = ConversionRequest::new(dec!(50)).from_currency("eur");
        let results = converter.conversion_results(request).await;

        assert_eq!(
            subtitles(&results),
            vec![
                "Currency conversion from EUR to GBP",
                "Currency conversion from EUR to USD",
            ]
        );
    }

    #[tokio::test]
    async fn test_self_conversion_yields_nothing() {
        let converter = converter(provider(), config());

        let results = converter.search("100 usd to usd", false).await;

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_alias_resolution_in_both_positions() {
        let converter = converter(provider(), config())
            .with_alias_table(AliasTable::from_pairs([("dollar", "usd"), ("€", "eur")]));

        let results = converter.search("100 dollar to €", false).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].subtitle, "Currency conversion from USD to EUR");
    }

    #[tokio::test]
    async fn test_alias_self_conversion_after_resolution() {
        let converter = converter(provider(), config())
            .with_alias_table(AliasTable::from_pairs([("dollar", "usd")]));

        let results = converter.search("100 dollar to usd", false).await;

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_currency_warning() {
        let converter = converter(provider(), config());

        let results = converter.search("100 usd to xyz", false).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "XYZ is not a valid currency");
        assert_eq!(results[0].outcome, Outcome::CurrencyNotFound);
        assert!(results[0].link.is_some());
    }

    #[tokio::test]
    async fn test_global_search_suppresses_warnings() {
        let converter = converter(provider(), config());

        let results = converter.search("100 usd to xyz", true).await;

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_warnings_in_global_when_enabled() {
        let config = ConverterConfig {
            show_warnings_in_global: true,
            ..config()
        };
        let converter = converter(provider(), config);

        let results = converter.search("100 usd to xyz", true).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].outcome, Outcome::CurrencyNotFound);
    }

    #[tokio::test]
    async fn test_invalid_expression_warning() {
        let converter = converter(provider(), config());

        let results = converter.search("100+ usd to eur", false).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Invalid expression provided");
        assert_eq!(results[0].outcome, Outcome::InvalidExpression);
    }

    #[tokio::test]
    async fn test_divide_by_zero_has_its_own_message() {
        let converter = converter(provider(), config());

        let results = converter.search("1/0 usd to eur", false).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Cannot divide by zero");
    }

    #[tokio::test]
    async fn test_invalid_expression_suppressed_in_global() {
        let converter = converter(provider(), config());

        let results = converter.search("100+ usd to eur", true).await;

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_expression_amount_end_to_end() {
        let converter = converter(provider(), config());

        let results = converter.search("(80+20)*1 usd to eur", false).await;

        assert_eq!(results[0].title, "92.00 EUR");
    }

    #[tokio::test]
    async fn test_duplicate_targets_are_deduplicated() {
        let config = ConverterConfig {
            target_currencies: vec!["eur".to_string(), "eur".to_string()],
            ..config()
        };
        let converter = converter(provider(), config);

        let request = ConversionRequest::new(dec!(100)).from_currency("usd");
        let results = converter.conversion_results(request).await;

        assert_eq!(
            subtitles(&results),
            vec!["Currency conversion from USD to EUR"]
        );
    }

    #[tokio::test]
    async fn test_request_builder_global_suppression() {
        let converter = converter(provider(), config());

        let request = ConversionRequest::new(dec!(100))
            .from_currency("usd")
            .to_currency("xyz")
            .global();
        let results = converter.conversion_results(request).await;

        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_alias_file_warning_is_always_shown() {
        let config = ConverterConfig {
            alias_path: Some(std::path::PathBuf::from("/nonexistent/alias.json")),
            ..config()
        };
        let converter = converter(provider(), config);

        // Even in global mode with warnings suppressed.
        let results = converter.search("100 usd to eur", true).await;

        assert_eq!(results[0].title, "Alias file not found");
        assert_eq!(results[0].outcome, Outcome::AliasFile);
        // The conversion itself still runs.
        assert_eq!(results[1].title, "92.00 EUR");
    }
}
