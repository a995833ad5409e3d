// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Deployment metadata and the resolver that turns it into an [`Attribution`].

use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::entry::Attribution;
use crate::registry::ContextRegistry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationMetadata {
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMetadata {
	pub name: String,
	pub application: Arc<ApplicationMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentMetadata {
	pub name: String,
	pub module: Arc<ModuleMetadata>,
	pub kind: ComponentKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ComponentKind {
	#[default]
	Standard,
	Web(WebComponent),
}

/// What a web-tier component serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebComponent {
	Servlet,
	/// The container's handler for static resources.
	StaticFile,
	/// A page compiled from a template file.
	CompiledTemplate { file: String },
}

/// Metadata describing a deployed unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentMetadata {
	Application(Arc<ApplicationMetadata>),
	Module(Arc<ModuleMetadata>),
	Component(Arc<ComponentMetadata>),
	/// Default metadata the container installs when no real unit is active.
	Placeholder,
}

impl DeploymentMetadata {
	pub fn application(name: impl Into<String>) -> Arc<ApplicationMetadata> {
		Arc::new(ApplicationMetadata { name: name.into() })
	}

	pub fn module(
		name: impl Into<String>,
		application: &Arc<ApplicationMetadata>,
	) -> Arc<ModuleMetadata> {
		Arc::new(ModuleMetadata {
			name: name.into(),
			application: Arc::clone(application),
		})
	}

	pub fn component(
		name: impl Into<String>,
		module: &Arc<ModuleMetadata>,
		kind: ComponentKind,
	) -> Arc<ComponentMetadata> {
		Arc::new(ComponentMetadata {
			name: name.into(),
			module: Arc::clone(module),
			kind,
		})
	}

	/// Name of the unit this metadata describes.
	pub fn name(&self) -> &str {
		match self {
			DeploymentMetadata::Application(app) => &app.name,
			DeploymentMetadata::Module(module) => &module.name,
			DeploymentMetadata::Component(component) => &component.name,
			DeploymentMetadata::Placeholder => "",
		}
	}

	/// Derive the attribution triple.
	pub fn attribution(&self) -> Attribution {
		match self {
			DeploymentMetadata::Module(module) => Attribution {
				application: Some(module.application.name.clone()),
				module: Some(module.name.clone()),
				component: None,
			},
			DeploymentMetadata::Component(component) => {
				let module = &component.module;
				let suppressed = matches!(
					component.kind,
					ComponentKind::Web(WebComponent::StaticFile)
						| ComponentKind::Web(WebComponent::CompiledTemplate { .. })
				);
				Attribution {
					application: Some(module.application.name.clone()),
					module: Some(module.name.clone()),
					component: (!suppressed).then(|| component.name.clone()),
				}
			}
			DeploymentMetadata::Application(app) => Attribution {
				application: Some(app.name.clone()),
				module: None,
				component: None,
			},
			DeploymentMetadata::Placeholder => Attribution::default(),
		}
	}
}

/// Determines which deployed unit a record belongs to.
#[derive(Clone)]
pub struct AttributionResolver {
	registry: Arc<ContextRegistry>,
}

impl AttributionResolver {
	pub fn new(registry: Arc<ContextRegistry>) -> Self {
		Self { registry }
	}

	/// Resolve the attribution for a record emitted under `ctx`.
	///
	/// Metadata bound to the unit of work wins. Otherwise, unless the thread
	/// belongs to a managed worker pool, the context handle is looked up in
	/// the registry. Nothing found yields an empty attribution.
	pub fn resolve(&self, ctx: &ExecutionContext) -> Attribution {
		let direct = ctx
			.metadata
			.as_ref()
			.filter(|m| !matches!(m.as_ref(), DeploymentMetadata::Placeholder))
			.cloned();

		let metadata = match direct {
			Some(metadata) => Some(metadata),
			None if ctx.pooled_worker => None,
			None => ctx.context_handle.and_then(|h| self.registry.lookup(h)),
		};

		metadata.map(|m| m.attribution()).unwrap_or_default()
	}

	pub fn registry(&self) -> &Arc<ContextRegistry> {
		&self.registry
	}
}
