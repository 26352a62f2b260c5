use {
    anyhow::{Context, anyhow},
    serde_json::Value,
    std::collections::HashMap,
};

pub type CalculatorMethod = Box<dyn Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync>;

/// Named methods a calculator exposes to the [`CalculationEngine`](crate::CalculationEngine).
#[derive(Default)]
pub struct CalculatorHandler {
    methods: HashMap<String, CalculatorMethod>,
}

impl CalculatorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Box::new(method));
        self
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn call(&self, name: &str, args: &[Value]) -> Option<anyhow::Result<Value>> {
        self.methods.get(name).map(|method| method(args))
    }
}

/// Types that publish their operations as a [`CalculatorHandler`].
pub trait Calculator {
    fn into_handler(self) -> CalculatorHandler;
}

/// Reads argument `index` as a number.
pub fn arg_f64(args: &[Value], index: usize) -> anyhow::Result<f64> {
    args.get(index)
        .with_context(|| format!("missing argument {index}"))?
        .as_f64()
        .ok_or_else(|| anyhow!("argument {index} is not a number"))
}

/// Reads argument `index` as a string.
pub fn arg_str(args: &[Value], index: usize) -> anyhow::Result<&str> {
    args.get(index)
        .with_context(|| format!("missing argument {index}"))?
        .as_str()
        .ok_or_else(|| anyhow!("argument {index} is not a string"))
}
