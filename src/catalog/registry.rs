//! Static registry of providers and actions.
//!
//! Assembled once at startup from plugins and immutable afterwards. Order is
//! significant: providers run, and actions are listed, in registration order
//! (plugin order, then the order each plugin declares them).

use crate::capability::{Action, Provider};
use crate::catalog::identity::TypeSet;
use crate::matcher::{provider_expands, provider_renders};
use anyhow::{Result, bail};
use std::collections::BTreeSet;
use std::sync::Arc;

/// A source of capabilities contributed to the registry.
pub trait Plugin {
    fn name(&self) -> &str;

    fn providers(&self) -> Vec<Arc<dyn Provider>> {
        Vec::new()
    }

    fn actions(&self) -> Vec<Arc<dyn Action>> {
        Vec::new()
    }
}

#[derive(Default)]
/// Registered providers and actions, in registration order.
pub struct CapabilityRegistry {
    providers: Vec<Arc<dyn Provider>>,
    actions: Vec<Arc<dyn Action>>,
}

impl CapabilityRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn providers(&self) -> &[Arc<dyn Provider>] {
        &self.providers
    }

    pub fn actions(&self) -> &[Arc<dyn Action>] {
        &self.actions
    }

    /// Look up a provider by id.
    pub fn provider(&self, id: &str) -> Option<&Arc<dyn Provider>> {
        self.providers.iter().find(|provider| provider.id() == id)
    }

    /// Providers able to expand an entity with `types`, in registration order.
    pub fn expanding(&self, types: &TypeSet) -> impl Iterator<Item = &Arc<dyn Provider>> {
        self.providers
            .iter()
            .filter(move |provider| provider_expands(provider.as_ref(), types))
    }

    /// Whether any registered provider could expand an entity with `types`.
    pub fn has_children(&self, types: &TypeSet) -> bool {
        self.expanding(types).next().is_some()
    }

    /// First provider declaring it renders icons for `types`.
    pub fn icon_provider(&self, types: &TypeSet) -> Option<&Arc<dyn Provider>> {
        self.providers
            .iter()
            .find(|provider| provider_renders(provider.as_ref(), types))
    }
}

#[derive(Default)]
/// Collects capabilities and rejects duplicate provider or action ids.
pub struct RegistryBuilder {
    providers: Vec<Arc<dyn Provider>>,
    actions: Vec<Arc<dyn Action>>,
}

impl RegistryBuilder {
    pub fn provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn action(mut self, action: Arc<dyn Action>) -> Self {
        self.actions.push(action);
        self
    }

    /// Register everything a plugin contributes.
    pub fn plugin(mut self, plugin: &dyn Plugin) -> Self {
        let providers = plugin.providers();
        let actions = plugin.actions();
        tracing::debug!(
            plugin = plugin.name(),
            providers = providers.len(),
            actions = actions.len(),
            "registering plugin"
        );
        self.providers.extend(providers);
        self.actions.extend(actions);
        self
    }

    pub fn build(self) -> Result<CapabilityRegistry> {
        let mut seen = BTreeSet::new();
        for provider in &self.providers {
            if provider.id().trim().is_empty() {
                bail!("encountered provider with no id");
            }
            if !seen.insert(provider.id().to_string()) {
                bail!("duplicate provider id {}", provider.id());
            }
        }
        let mut action_ids = BTreeSet::new();
        for action in &self.actions {
            let spec = action.spec();
            if spec.name.trim().is_empty() {
                bail!("encountered action with no name");
            }
            if spec.direct_types.is_empty() {
                bail!("action '{}' declares no direct types", spec.name);
            }
            let id = spec.to_raw_item().resolved_id();
            if !action_ids.insert(id.clone()) {
                bail!("action '{}' resolves to duplicate id {id}", spec.name);
            }
        }
        Ok(CapabilityRegistry {
            providers: self.providers,
            actions: self.actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::ActionOutcome;
    use crate::catalog::identity::types;
    use crate::catalog::model::{ActionSpec, Item, Meta, RawItem};
    use crate::context::ResolutionContext;
    use async_trait::async_trait;

    struct Stub {
        id: &'static str,
        input_types: TypeSet,
        output_types: Option<TypeSet>,
    }

    impl Stub {
        fn new(id: &'static str, input: &'static str) -> Arc<dyn Provider> {
            Arc::new(Self {
                id,
                input_types: types([input]),
                output_types: None,
            })
        }

        fn rendering(id: &'static str, output: &'static str) -> Arc<dyn Provider> {
            Arc::new(Self {
                id,
                input_types: types(["never"]),
                output_types: Some(types([output])),
            })
        }
    }

    #[async_trait]
    impl Provider for Stub {
        fn id(&self) -> &str {
            self.id
        }

        fn input_types(&self) -> &TypeSet {
            &self.input_types
        }

        fn output_types(&self) -> Option<&TypeSet> {
            self.output_types.as_ref()
        }

        async fn run(&self, _meta: &Meta, _ctx: &ResolutionContext) -> Result<Vec<RawItem>> {
            Ok(Vec::new())
        }
    }

    struct Named(ActionSpec);

    #[async_trait]
    impl Action for Named {
        fn spec(&self) -> &ActionSpec {
            &self.0
        }

        async fn run(&self, _direct: &Item, _indirect: Option<&Item>) -> Result<ActionOutcome> {
            Ok(ActionOutcome::done())
        }
    }

    struct Bundle;

    impl Plugin for Bundle {
        fn name(&self) -> &str {
            "bundle"
        }

        fn providers(&self) -> Vec<Arc<dyn Provider>> {
            vec![Stub::new("b1", "public.folder"), Stub::new("b2", "public.folder")]
        }

        fn actions(&self) -> Vec<Arc<dyn Action>> {
            vec![Arc::new(Named(ActionSpec::new("Open", types(["public.item"]))))]
        }
    }

    #[test]
    fn preserves_registration_order_across_plugins() {
        let registry = CapabilityRegistry::builder()
            .provider(Stub::new("first", "public.folder"))
            .plugin(&Bundle)
            .provider(Stub::new("last", "public.item"))
            .build()
            .expect("registry builds");
        let expanding: Vec<_> = registry
            .expanding(&types(["public.folder"]))
            .map(|provider| provider.id())
            .collect();
        assert_eq!(expanding, vec!["first", "b1", "b2"]);
        assert_eq!(registry.actions().len(), 1);
        assert!(registry.provider("last").is_some());
        assert!(registry.provider("missing").is_none());
    }

    #[test]
    fn has_children_is_any_input_type_intersection() {
        let registry = CapabilityRegistry::builder()
            .provider(Stub::new("folders", "public.folder"))
            .build()
            .expect("registry builds");
        assert!(registry.has_children(&types(["public.item", "public.folder"])));
        assert!(!registry.has_children(&types(["public.item"])));
        assert!(!registry.has_children(&TypeSet::new()));
    }

    #[test]
    fn icon_provider_is_first_matching_output() {
        let registry = CapabilityRegistry::builder()
            .provider(Stub::new("folders", "public.folder"))
            .provider(Stub::rendering("images", "public.image"))
            .provider(Stub::rendering("images-too", "public.image"))
            .build()
            .expect("registry builds");
        let chosen = registry
            .icon_provider(&types(["public.image"]))
            .map(|provider| provider.id());
        assert_eq!(chosen, Some("images"));
        assert!(registry.icon_provider(&types(["public.folder"])).is_none());
    }

    #[test]
    fn same_named_actions_with_different_types_coexist() {
        let registry = CapabilityRegistry::builder()
            .action(Arc::new(Named(ActionSpec::new("Open", types(["public.item"])))))
            .action(Arc::new(Named(ActionSpec::new("Open", types(["public.url"])))))
            .build()
            .expect("distinct action ids");
        assert_eq!(registry.actions().len(), 2);
    }

    #[test]
    fn rejects_duplicate_ids_and_untyped_actions() {
        let duplicate = CapabilityRegistry::builder()
            .provider(Stub::new("same", "a"))
            .provider(Stub::new("same", "b"))
            .build();
        assert!(duplicate.is_err());

        let same_action = CapabilityRegistry::builder()
            .action(Arc::new(Named(ActionSpec::new("Open", types(["public.item"])))))
            .action(Arc::new(Named(ActionSpec::new("Open", types(["public.item"])))))
            .build();
        let message = same_action.err().map(|err| err.to_string()).unwrap_or_default();
        assert!(message.contains("duplicate id"), "{message}");

        let untyped = CapabilityRegistry::builder()
            .action(Arc::new(Named(ActionSpec::new("Nothing", TypeSet::new()))))
            .build();
        assert!(untyped.is_err());
    }
}
