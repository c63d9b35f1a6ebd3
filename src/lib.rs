//! Stickplate: binding overlays for HOTAS reference sheets.
//!
//! Matches profile devices to visual templates, maps template fields to canonical
//! input codes, merges the actions bound to each input into one label, and lays the
//! labels out as draw instructions for an external renderer.
//!
//! ```no_run
//! use stickplate::{
//!     compose, DeviceResolver, LabelOverrideStore, LayoutStyle, OverlayEngine, Profile,
//!     Surface, SurfaceField, TemplateRegistry,
//! };
//! use std::path::Path;
//!
//! # fn run(profile: Profile) -> stickplate::Result<()> {
//! let registry = TemplateRegistry::load(Path::new("templates/template_registry.json"))?;
//! let store = LabelOverrideStore::open(Path::new("."));
//! let engine = OverlayEngine::new(LayoutStyle::load_or_default(Path::new("style.toml")));
//!
//! for device in profile.joysticks() {
//!     for component in DeviceResolver::new(&registry).resolve(device) {
//!         let fields = [SurfaceField::new("js1_button1", 120.0, 80.0)];
//!         let surface = Surface { width: 1024.0, height: 768.0 };
//!         let overlay = compose(&component, &profile, &store, &fields, surface, &engine);
//!         let count = overlay.layout.instructions.len();
//!         println!("{}: {count} instructions", overlay.component_name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod binding;
pub mod device;
pub mod error;
pub mod field_map;
pub mod input;
pub mod label;
pub mod layout;
pub mod logger;
pub mod metadata;
pub mod overlay;
pub mod overrides;
pub mod registry;
pub mod resolver;

pub use aggregate::{BindingAggregator, InputLabelEntry, LabelTable};
pub use binding::{ActionBinding, ActionMap, Profile};
pub use device::{Device, DeviceType};
pub use error::{Error, Result};
pub use field_map::{FieldMapper, FieldMapping};
pub use input::{InputCode, InputKind};
pub use layout::style::LayoutStyle;
pub use layout::{Annotation, DrawInstruction, OverlayEngine, OverlayLayout, Surface};
pub use overlay::{compose, Overlay, SurfaceField};
pub use overrides::LabelOverrideStore;
pub use registry::{InputRange, Template, TemplateRegistry};
pub use resolver::{CompositeRule, DeviceResolver, ResolvedComponent};
