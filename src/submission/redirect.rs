use std::fmt;
use std::sync::Arc;

type Resolver<I, O> = Arc<dyn Fn(&O, &I) -> Option<String> + Send + Sync>;

/// Where to go after a successful submission.
pub enum RedirectTarget<I, O> {
    Static(String),
    /// Computed from the mutation output and the submitted input.
    Resolve(Resolver<I, O>),
}

impl<I, O> RedirectTarget<I, O> {
    pub fn to(path: impl Into<String>) -> Self {
        RedirectTarget::Static(path.into())
    }

    pub fn resolve_with<F>(resolver: F) -> Self
    where
        F: Fn(&O, &I) -> Option<String> + Send + Sync + 'static,
    {
        RedirectTarget::Resolve(Arc::new(resolver))
    }

    pub fn resolve(&self, output: &O, input: &I) -> Option<String> {
        match self {
            RedirectTarget::Static(path) => Some(path.clone()),
            RedirectTarget::Resolve(resolver) => resolver(output, input),
        }
    }
}

impl<I, O> Clone for RedirectTarget<I, O> {
    fn clone(&self) -> Self {
        match self {
            RedirectTarget::Static(path) => RedirectTarget::Static(path.clone()),
            RedirectTarget::Resolve(resolver) => RedirectTarget::Resolve(Arc::clone(resolver)),
        }
    }
}

impl<I, O> fmt::Debug for RedirectTarget<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectTarget::Static(path) => f.debug_tuple("Static").field(path).finish(),
            RedirectTarget::Resolve(_) => f.write_str("Resolve(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_target_always_resolves() {
        let target: RedirectTarget<(), ()> = RedirectTarget::to("/next");
        assert_eq!(target.resolve(&(), &()), Some("/next".to_string()));
    }

    #[test]
    fn resolver_sees_output_and_input() {
        let target: RedirectTarget<String, u32> =
            RedirectTarget::resolve_with(|step, slug| (*step > 1).then(|| format!("/{slug}/{step}")));
        assert_eq!(target.resolve(&2, &"letter".to_string()), Some("/letter/2".to_string()));
        assert_eq!(target.resolve(&1, &"letter".to_string()), None);
    }
}
