//! Install and uninstall plans.
//!
//! A plan lists the steps `install` or `uninstall` performs against vCloud
//! Director for the selected templates. Executing the steps is delegated to
//! a [`Workflow`]; [`PlanReporter`] prints them.

use std::fmt;
use std::io::Write;

use cse_core::version::PRODUCT;
use cse_core::{Config, ConfigError, TemplateFilter};

/// One step of an install or uninstall plan.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Step {
    CreateCatalog { catalog: String },
    UploadTemplate { template: String, catalog: String },
    CustomizeVapp { template: String, key_filename: Option<String> },
    CaptureVapp { template: String, catalog: String },
    RegisterExtension { exchange: String, routing_key: String },
    DeleteTemplate { template: String, catalog: String },
    DeleteCatalog { catalog: String },
    UnregisterExtension,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateCatalog { catalog } => write!(f, "create catalog '{catalog}' if missing"),
            Self::UploadTemplate { template, catalog } => {
                write!(f, "upload template '{template}' to catalog '{catalog}'")
            }
            Self::CustomizeVapp { template, key_filename: Some(key) } => {
                write!(f, "create temporary vApp from '{template}' with key '{key}'")
            }
            Self::CustomizeVapp { template, key_filename: None } => {
                write!(f, "create temporary vApp from '{template}'")
            }
            Self::CaptureVapp { template, catalog } => {
                write!(f, "capture vApp for '{template}' into catalog '{catalog}'")
            }
            Self::RegisterExtension { exchange, routing_key } => write!(
                f,
                "register extension '{PRODUCT}' on exchange '{exchange}' with routing key '{routing_key}'"
            ),
            Self::DeleteTemplate { template, catalog } => {
                write!(f, "delete template '{template}' from catalog '{catalog}'")
            }
            Self::DeleteCatalog { catalog } => write!(f, "delete catalog '{catalog}'"),
            Self::UnregisterExtension => write!(f, "unregister extension '{PRODUCT}'"),
        }
    }
}

/// Ordered steps for `install` or `uninstall`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub templates: Vec<String>,
    pub steps: Vec<Step>,
}

impl Plan {
    /// Plan an installation of the selected templates.
    ///
    /// With `capture == false` the temporary vApps are created but not
    /// captured into the catalog.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownTemplate`] if the filter names a template
    /// the broker section does not define.
    pub fn install(config: &Config, filter: &TemplateFilter, capture: bool) -> Result<Self, ConfigError> {
        let templates = selected_templates(config, filter)?;
        let mut steps = Vec::new();

        if let Some(broker) = &config.broker {
            steps.push(Step::CreateCatalog { catalog: broker.catalog.clone() });
            for template in &templates {
                steps.push(Step::UploadTemplate {
                    template: template.clone(),
                    catalog: broker.catalog.clone(),
                });
                steps.push(Step::CustomizeVapp {
                    template: template.clone(),
                    key_filename: config.service.key_filename_pub.clone(),
                });
                if capture {
                    steps.push(Step::CaptureVapp {
                        template: template.clone(),
                        catalog: broker.catalog.clone(),
                    });
                }
            }
        }
        steps.push(Step::RegisterExtension {
            exchange: config.amqp.exchange.clone(),
            routing_key: config.amqp.routing_key.clone(),
        });

        Ok(Self { templates, steps })
    }

    /// Plan removal of the selected templates.
    ///
    /// The catalog is deleted only when every template is selected.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownTemplate`] if the filter names a template
    /// the broker section does not define.
    pub fn uninstall(config: &Config, filter: &TemplateFilter) -> Result<Self, ConfigError> {
        let templates = selected_templates(config, filter)?;
        let mut steps = vec![Step::UnregisterExtension];

        if let Some(broker) = &config.broker {
            for template in &templates {
                steps.push(Step::DeleteTemplate {
                    template: template.clone(),
                    catalog: broker.catalog.clone(),
                });
            }
            if *filter == TemplateFilter::All {
                steps.push(Step::DeleteCatalog { catalog: broker.catalog.clone() });
            }
        }

        Ok(Self { templates, steps })
    }
}

/// Templates selected by `filter`; none when there is no broker section.
///
/// # Errors
/// Returns [`ConfigError::UnknownTemplate`] for a named template that is not
/// defined, including when the broker section is absent.
pub fn selected_templates(config: &Config, filter: &TemplateFilter) -> Result<Vec<String>, ConfigError> {
    match (&config.broker, filter) {
        (Some(broker), _) => Ok(filter
            .select(broker)?
            .into_iter()
            .map(str::to_owned)
            .collect()),
        (None, TemplateFilter::All) => Ok(Vec::new()),
        (None, TemplateFilter::Named(name)) => {
            Err(ConfigError::UnknownTemplate { name: name.clone() })
        }
    }
}

/// Carries out install and uninstall plans.
pub trait Workflow {
    /// Apply an install plan.
    ///
    /// # Errors
    /// Returns an I/O error if progress cannot be written.
    fn install(&self, plan: &Plan, out: &mut dyn Write) -> std::io::Result<()>;

    /// Apply an uninstall plan.
    ///
    /// # Errors
    /// Returns an I/O error if progress cannot be written.
    fn uninstall(&self, plan: &Plan, out: &mut dyn Write) -> std::io::Result<()>;
}

/// Prints each plan step without contacting vCloud Director.
#[derive(Debug, Default)]
pub struct PlanReporter;

impl PlanReporter {
    fn print(action: &str, plan: &Plan, out: &mut dyn Write) -> std::io::Result<()> {
        let total = plan.steps.len();
        writeln!(out, "{action} plan ({total} steps):")?;
        for (i, step) in plan.steps.iter().enumerate() {
            tracing::info!(action, step = %step, "plan step");
            writeln!(out, "  [{}/{total}] {step}", i + 1)?;
        }
        Ok(())
    }
}

impl Workflow for PlanReporter {
    fn install(&self, plan: &Plan, out: &mut dyn Write) -> std::io::Result<()> {
        Self::print("Install", plan, out)
    }

    fn uninstall(&self, plan: &Plan, out: &mut dyn Write) -> std::io::Result<()> {
        Self::print("Uninstall", plan, out)
    }
}
