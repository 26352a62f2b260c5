use {
    crate::{CalculationError, CalculatorHandler},
    bevy::prelude::*,
    cache_system::{Cache, CacheConfig, CacheOptions, format_hit_rate},
    serde::Serialize,
    serde_json::Value,
    std::{collections::HashMap, time::Duration},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct CalculateOptions {
    /// Skip the result cache for this call (neither read nor written).
    pub no_cache: bool,
}

impl CalculateOptions {
    pub fn uncached() -> Self {
        Self { no_cache: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationCacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub total_requests: u64,
    pub hit_rate: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalculationDebugInfo {
    pub registered_calculators: Vec<String>,
    pub cache_stats: CalculationCacheStats,
    pub cache_config: CacheConfig,
}

/// Memoizing dispatcher over registered calculators.
///
/// Results are cached under a key built from `(type, method, args)` in a cache
/// owned by the engine, separate from the shared cache.
#[derive(Resource)]
pub struct CalculationEngine {
    calculators: HashMap<String, CalculatorHandler>,
    cache: Cache<Value>,
    cache_config: CacheConfig,
}

impl Default for CalculationEngine {
    fn default() -> Self {
        Self::new(CacheConfig::new(
            500,
            Duration::from_secs(60),
            Duration::from_secs(30),
        ))
    }
}

impl CalculationEngine {
    pub fn new(cache_config: CacheConfig) -> Self {
        let cache_config = cache_config.sanitized();
        Self {
            calculators: HashMap::new(),
            cache: Cache::new(cache_config),
            cache_config,
        }
    }

    /// Registers (or replaces) the calculator for `calculator_type`.
    pub fn register_calculator(
        &mut self,
        calculator_type: &str,
        handler: CalculatorHandler,
    ) -> Result<(), CalculationError> {
        if calculator_type.is_empty() {
            return Err(CalculationError::InvalidRegistration(
                "calculator type must not be empty",
            ));
        }
        if handler.is_empty() {
            return Err(CalculationError::InvalidRegistration(
                "calculator handler exposes no methods",
            ));
        }

        if self
            .calculators
            .insert(calculator_type.to_string(), handler)
            .is_some()
        {
            // Old results may come from the replaced implementation.
            self.clear_cache(Some(calculator_type));
            debug!(%calculator_type, "calculator replaced");
        } else {
            debug!(%calculator_type, "calculator registered");
        }
        Ok(())
    }

    pub fn calculate(
        &mut self,
        calculator_type: &str,
        method: &str,
        args: &[Value],
        options: CalculateOptions,
    ) -> Result<Value, CalculationError> {
        let handler = self.calculators.get(calculator_type).ok_or_else(|| {
            CalculationError::NotRegistered {
                calculator: calculator_type.to_string(),
            }
        })?;
        if !handler.has_method(method) {
            return Err(CalculationError::MissingMethod {
                calculator: calculator_type.to_string(),
                method: method.to_string(),
            });
        }

        if options.no_cache {
            return Self::invoke(handler, calculator_type, method, args);
        }

        let key = generate_cache_key(calculator_type, method, args);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached.clone());
        }

        let result = Self::invoke(handler, calculator_type, method, args)?;
        self.cache.set(key, result.clone(), CacheOptions::new());
        Ok(result)
    }

    fn invoke(
        handler: &CalculatorHandler,
        calculator_type: &str,
        method: &str,
        args: &[Value],
    ) -> Result<Value, CalculationError> {
        match handler.call(method, args) {
            Some(result) => result.map_err(CalculationError::Handler),
            None => Err(CalculationError::MissingMethod {
                calculator: calculator_type.to_string(),
                method: method.to_string(),
            }),
        }
    }

    /// Drops cached results, all of them or only those of one calculator type.
    pub fn clear_cache(&mut self, calculator_type: Option<&str>) -> usize {
        match calculator_type {
            Some(calculator_type) => self.cache.clear(Some(&format!("{calculator_type}:"))),
            None => self.cache.clear(None),
        }
    }

    pub fn cache_stats(&self) -> CalculationCacheStats {
        let stats = self.cache.stats();
        CalculationCacheStats {
            size: stats.size,
            hits: stats.hits,
            misses: stats.misses,
            total_requests: stats.total_requests,
            hit_rate: format_hit_rate(stats.hits, stats.misses),
        }
    }

    pub fn registered_calculators(&self) -> Vec<String> {
        let mut names: Vec<String> = self.calculators.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn has_calculator(&self, calculator_type: &str) -> bool {
        self.calculators.contains_key(calculator_type)
    }

    pub fn debug_info(&self) -> CalculationDebugInfo {
        CalculationDebugInfo {
            registered_calculators: self.registered_calculators(),
            cache_stats: self.cache_stats(),
            cache_config: self.cache_config,
        }
    }

    /// Advances the result cache clock.
    pub fn tick(&mut self, delta: Duration) {
        self.cache.tick(delta);
    }

    /// Clears cached results and unregisters every calculator.
    pub fn destroy(&mut self) {
        self.cache.destroy();
        self.calculators.clear();
    }
}

/// Deterministic cache key for a calculation. Arguments are compared by value
/// and in order.
pub fn generate_cache_key(calculator_type: &str, method: &str, args: &[Value]) -> String {
    let args = Value::Array(args.to_vec());
    format!("{calculator_type}:{method}:{args}")
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::arg_f64,
        anyhow::bail,
        serde_json::json,
        std::sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    fn math() -> CalculatorHandler {
        CalculatorHandler::new()
            .with_method("add", |args| Ok(json!(arg_f64(args, 0)? + arg_f64(args, 1)?)))
            .with_method("fail", |_| bail!("division by zero"))
    }

    fn engine_with_math() -> CalculationEngine {
        let mut engine = CalculationEngine::default();
        engine.register_calculator("math", math()).unwrap();
        engine
    }

    #[test]
    fn registration_is_validated() {
        let mut engine = CalculationEngine::default();
        assert!(matches!(
            engine.register_calculator("", math()),
            Err(CalculationError::InvalidRegistration(_))
        ));
        assert!(matches!(
            engine.register_calculator("empty", CalculatorHandler::new()),
            Err(CalculationError::InvalidRegistration(_))
        ));
        assert!(engine.registered_calculators().is_empty());
    }

    #[test]
    fn repeat_calls_hit_the_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut engine = CalculationEngine::default();
        engine
            .register_calculator(
                "math",
                CalculatorHandler::new().with_method("add", move |args| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(json!(arg_f64(args, 0)? + arg_f64(args, 1)?))
                }),
            )
            .unwrap();

        let args = [json!(2), json!(3)];
        let first = engine.calculate("math", "add", &args, CalculateOptions::default()).unwrap();
        let second = engine.calculate("math", "add", &args, CalculateOptions::default()).unwrap();

        assert_eq!(first, json!(5.0));
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = engine.cache_stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.hit_rate, "50.00%");
    }

    #[test]
    fn no_cache_bypasses_memoization() {
        let mut engine = engine_with_math();
        let args = [json!(1), json!(1)];
        engine.calculate("math", "add", &args, CalculateOptions::uncached()).unwrap();
        engine.calculate("math", "add", &args, CalculateOptions::uncached()).unwrap();

        let stats = engine.cache_stats();
        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.size, 0);
    }

    #[test]
    fn unknown_type_and_method_are_rejected() {
        let mut engine = engine_with_math();
        let err = engine
            .calculate("physics", "add", &[], CalculateOptions::default())
            .unwrap_err();
        assert!(matches!(err, CalculationError::NotRegistered { .. }));
        assert!(err.to_string().contains("not registered"));

        let err = engine
            .calculate("math", "mul", &[], CalculateOptions::default())
            .unwrap_err();
        assert!(matches!(err, CalculationError::MissingMethod { .. }));
        assert!(err.to_string().contains("does not exist for type"));
    }

    #[test]
    fn handler_errors_propagate_uncached() {
        let mut engine = engine_with_math();
        let err = engine
            .calculate("math", "fail", &[], CalculateOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "division by zero");
        assert_eq!(engine.cache_stats().size, 0);

        let err = engine
            .calculate("math", "add", &[json!("x")], CalculateOptions::default())
            .unwrap_err();
        assert!(matches!(err, CalculationError::Handler(_)));
    }

    #[test]
    fn cache_keys_are_deterministic() {
        let a = generate_cache_key("math", "add", &[json!(2), json!(3)]);
        assert_eq!(a, generate_cache_key("math", "add", &[json!(2), json!(3)]));
        assert_ne!(a, generate_cache_key("math", "add", &[json!(3), json!(4)]));
        assert_ne!(a, generate_cache_key("math", "add", &[json!(3), json!(2)]));
        assert_ne!(a, generate_cache_key("math", "sub", &[json!(2), json!(3)]));
        assert_ne!(a, generate_cache_key("algebra", "add", &[json!(2), json!(3)]));
    }

    #[test]
    fn clear_cache_by_type() {
        let mut engine = engine_with_math();
        engine
            .register_calculator(
                "mathx",
                CalculatorHandler::new().with_method("one", |_| Ok(json!(1))),
            )
            .unwrap();

        engine.calculate("math", "add", &[json!(1), json!(2)], CalculateOptions::default()).unwrap();
        engine.calculate("mathx", "one", &[], CalculateOptions::default()).unwrap();

        assert_eq!(engine.clear_cache(Some("math")), 1);
        assert_eq!(engine.cache_stats().size, 1);
        assert_eq!(engine.clear_cache(None), 1);
    }

    #[test]
    fn cache_size_is_bounded() {
        let mut engine = CalculationEngine::new(CacheConfig::new(
            3,
            Duration::from_secs(60),
            Duration::from_secs(60),
        ));
        engine.register_calculator("math", math()).unwrap();
        for i in 0..10 {
            engine
                .calculate("math", "add", &[json!(i), json!(1)], CalculateOptions::default())
                .unwrap();
        }
        assert_eq!(engine.cache_stats().size, 3);
    }

    #[test]
    fn cached_results_expire() {
        let mut engine = CalculationEngine::new(CacheConfig::new(
            10,
            Duration::from_millis(100),
            Duration::from_secs(60),
        ));
        engine.register_calculator("math", math()).unwrap();
        let args = [json!(1), json!(2)];
        engine.calculate("math", "add", &args, CalculateOptions::default()).unwrap();
        engine.tick(Duration::from_millis(100));
        engine.calculate("math", "add", &args, CalculateOptions::default()).unwrap();

        assert_eq!(engine.cache_stats().misses, 2);
    }

    #[test]
    fn debug_info_and_destroy() {
        let mut engine = engine_with_math();
        let info = engine.debug_info();
        assert_eq!(info.registered_calculators, vec!["math".to_string()]);
        assert!(engine.has_calculator("math"));

        engine.destroy();
        assert!(!engine.has_calculator("math"));
        assert_eq!(engine.cache_stats().size, 0);
    }
}
