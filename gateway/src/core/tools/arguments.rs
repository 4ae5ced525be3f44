use serde_json::{Map, Value};
use thiserror::Error;

use super::descriptor::{
    CREATE_BOOKING, GET_ALL_EMPLOYEES, GET_COMPANY_INFO, GET_EMPLOYEE_BY_NAME,
    GET_EMPLOYEES_BY_DEPARTMENT, GET_EMPLOYEES_BY_DESIGNATION, GET_FAQS_BY_CATEGORY,
    GET_SERVICE_INFO, SEARCH_FAQS, ToolDescriptor, find_tool,
};
use crate::core::bookings::{BookingStoreError, NewBooking};

/// Reasons a tool call cannot produce a payload.
///
/// Never leaves the dispatcher; every variant becomes a failure result.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Arguments for {tool} are not a JSON object: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Missing required argument '{field}' for {tool}")]
    MissingArgument { tool: String, field: &'static str },

    #[error("Argument '{field}' for {tool} must be a {expected}")]
    WrongType {
        tool: String,
        field: &'static str,
        expected: &'static str,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("Booking failed: {0}")]
    Booking(#[from] BookingStoreError),

    #[error("Failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Validated, typed arguments; one variant per tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArguments {
    EmployeeByName { name: String },
    EmployeesByDesignation { designation: String },
    EmployeesByDepartment { department: String },
    AllEmployees,
    CompanyInfo,
    ServiceInfo { service: String },
    FaqsByCategory { category: String },
    SearchFaqs { keyword: String },
    CreateBooking(NewBooking),
}

impl ToolArguments {
    /// Parse the argument string carried by a function-call event.
    ///
    /// An empty or whitespace-only string is treated as `{}`.
    pub fn from_call(tool: &str, raw: &str) -> Result<Self, ToolError> {
        let value = if raw.trim().is_empty() {
            Value::Object(Map::new())
        } else {
            serde_json::from_str(raw).map_err(|e| ToolError::InvalidArguments {
                tool: tool.to_string(),
                reason: e.to_string(),
            })?
        };
        Self::from_value(tool, &value)
    }

    /// Validate `value` against the tool's schema and build the typed form.
    pub fn from_value(tool: &str, value: &Value) -> Result<Self, ToolError> {
        let descriptor =
            find_tool(tool).ok_or_else(|| ToolError::UnknownTool(tool.to_string()))?;
        let args = validate(descriptor, value)?;

        let string = |field: &str| -> String {
            args.get(field)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default()
        };

        let parsed = match descriptor.name {
            GET_EMPLOYEE_BY_NAME => Self::EmployeeByName {
                name: string("name"),
            },
            GET_EMPLOYEES_BY_DESIGNATION => Self::EmployeesByDesignation {
                designation: string("designation"),
            },
            GET_EMPLOYEES_BY_DEPARTMENT => Self::EmployeesByDepartment {
                department: string("department"),
            },
            GET_ALL_EMPLOYEES => Self::AllEmployees,
            GET_COMPANY_INFO => Self::CompanyInfo,
            GET_SERVICE_INFO => Self::ServiceInfo {
                service: string("service"),
            },
            GET_FAQS_BY_CATEGORY => Self::FaqsByCategory {
                category: string("category"),
            },
            SEARCH_FAQS => Self::SearchFaqs {
                keyword: string("keyword"),
            },
            CREATE_BOOKING => Self::CreateBooking(NewBooking::new(
                string("name"),
                string("email"),
                string("phone"),
            )),
            other => return Err(ToolError::UnknownTool(other.to_string())),
        };
        Ok(parsed)
    }

    /// Name of the tool these arguments belong to.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::EmployeeByName { .. } => GET_EMPLOYEE_BY_NAME,
            Self::EmployeesByDesignation { .. } => GET_EMPLOYEES_BY_DESIGNATION,
            Self::EmployeesByDepartment { .. } => GET_EMPLOYEES_BY_DEPARTMENT,
            Self::AllEmployees => GET_ALL_EMPLOYEES,
            Self::CompanyInfo => GET_COMPANY_INFO,
            Self::ServiceInfo { .. } => GET_SERVICE_INFO,
            Self::FaqsByCategory { .. } => GET_FAQS_BY_CATEGORY,
            Self::SearchFaqs { .. } => SEARCH_FAQS,
            Self::CreateBooking(_) => CREATE_BOOKING,
        }
    }
}

/// Check required fields and declared types. Undeclared fields are ignored.
fn validate<'a>(
    descriptor: &ToolDescriptor,
    value: &'a Value,
) -> Result<&'a Map<String, Value>, ToolError> {
    static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();

    let args = match value {
        Value::Object(map) => map,
        Value::Null => EMPTY.get_or_init(Map::new),
        other => {
            return Err(ToolError::InvalidArguments {
                tool: descriptor.name.to_string(),
                reason: format!("expected an object, got {other}"),
            });
        }
    };

    for param in descriptor.params {
        match args.get(param.name) {
            None | Some(Value::Null) if param.required => {
                return Err(ToolError::MissingArgument {
                    tool: descriptor.name.to_string(),
                    field: param.name,
                });
            }
            None | Some(Value::Null) => {}
            Some(v) if !param.param_type.matches(v) => {
                return Err(ToolError::WrongType {
                    tool: descriptor.name.to_string(),
                    field: param.name,
                    expected: param.param_type.as_str(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(args)
}
