use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, info, warn};

use super::arguments::{ToolArguments, ToolError};
use super::descriptor::{TOOL_CATALOGUE, ToolDescriptor};
use super::result::ToolResult;
use crate::core::bookings::SharedBookingStore;
use crate::core::knowledge::KnowledgeBase;

/// A function call extracted from the upstream event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCall {
    pub call_id: String,
    pub name: String,
    /// JSON-encoded argument object, possibly empty
    pub arguments: String,
}

/// Executes tool calls against the knowledge base and the booking store.
///
/// Cheap to clone; every session holds its own handle.
#[derive(Clone)]
pub struct ToolDispatcher {
    knowledge: Arc<KnowledgeBase>,
    bookings: SharedBookingStore,
}

impl ToolDispatcher {
    pub fn new(knowledge: Arc<KnowledgeBase>, bookings: SharedBookingStore) -> Self {
        Self {
            knowledge,
            bookings,
        }
    }

    /// Descriptors advertised upstream.
    pub fn descriptors(&self) -> &'static [ToolDescriptor] {
        TOOL_CATALOGUE
    }

    /// Run a call extracted from the event stream. Never fails.
    pub async fn dispatch_call(&self, call: &ToolCall) -> ToolResult {
        debug!(
            call_id = %call.call_id,
            tool = %call.name,
            "Dispatching tool call"
        );
        let outcome = match ToolArguments::from_call(&call.name, &call.arguments) {
            Ok(args) => self.execute(args).await,
            Err(e) => Err(e),
        };
        Self::into_result(&call.name, outcome)
    }

    /// Run a tool with an already-decoded argument object. Never fails.
    pub async fn dispatch(&self, name: &str, arguments: &Value) -> ToolResult {
        let outcome = match ToolArguments::from_value(name, arguments) {
            Ok(args) => self.execute(args).await,
            Err(e) => Err(e),
        };
        Self::into_result(name, outcome)
    }

    fn into_result(name: &str, outcome: Result<Value, ToolError>) -> ToolResult {
        match outcome {
            Ok(data) => {
                info!(tool = %name, "Tool call succeeded");
                ToolResult::success(data)
            }
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool call failed");
                ToolResult::failure(e.to_string())
            }
        }
    }

    async fn execute(&self, args: ToolArguments) -> Result<Value, ToolError> {
        debug!(tool = args.tool_name(), "Arguments validated");
        let kb = &self.knowledge;

        match args {
            ToolArguments::EmployeeByName { name } => {
                non_empty(kb.employees_by_name(&name), || {
                    format!("No employee found with a name matching '{name}'")
                })
            }
            ToolArguments::EmployeesByDesignation { designation } => {
                non_empty(kb.employees_by_designation(&designation), || {
                    format!("No employees found with designation '{designation}'")
                })
            }
            ToolArguments::EmployeesByDepartment { department } => {
                non_empty(kb.employees_by_department(&department), || {
                    format!("No employees found in department '{department}'")
                })
            }
            ToolArguments::AllEmployees => non_empty(kb.employee_summaries(), || {
                "The employee directory is empty".to_string()
            }),
            ToolArguments::CompanyInfo => {
                let company = kb.company();
                let services: Vec<&str> =
                    company.services.iter().map(|s| s.name.as_str()).collect();
                Ok(json!({
                    "name": company.name,
                    "tagline": company.tagline,
                    "description": company.description,
                    "founded": company.founded,
                    "headquarters": company.headquarters,
                    "email": company.email,
                    "phone": company.phone,
                    "website": company.website,
                    "services": services,
                }))
            }
            ToolArguments::ServiceInfo { service } => {
                non_empty(kb.services_matching(&service), || {
                    format!("No service found matching '{service}'")
                })
            }
            ToolArguments::FaqsByCategory { category } => {
                non_empty(kb.faq_categories_matching(&category), || {
                    format!("No FAQ category found matching '{category}'")
                })
            }
            ToolArguments::SearchFaqs { keyword } => non_empty(kb.search_faqs(&keyword), || {
                format!("No FAQs mention '{keyword}'")
            }),
            ToolArguments::CreateBooking(booking) => {
                let stored = self.bookings.create(booking).await?;
                info!(
                    booking_id = %stored.id,
                    store = self.bookings.name(),
                    "Booking created from tool call"
                );
                Ok(serde_json::to_value(stored)?)
            }
        }
    }
}

/// Serialize a match set, or fail with `message` when it is empty.
fn non_empty<T: serde::Serialize>(
    matches: Vec<T>,
    message: impl FnOnce() -> String,
) -> Result<Value, ToolError> {
    if matches.is_empty() {
        return Err(ToolError::NotFound(message()));
    }
    Ok(serde_json::to_value(matches)?)
}
