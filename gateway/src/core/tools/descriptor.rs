//! Tool descriptors advertised to the realtime session.
//!
//! The same table drives two things: the `tools` array of the
//! `session.update` event and the argument validation performed before a
//! call is dispatched.

use serde_json::{Map, Value, json};

use crate::core::realtime::ToolDef;

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    Boolean,
}

impl ParamType {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    /// Whether `value` has this JSON type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// A named parameter in a tool schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub param_type: ParamType,
    pub description: &'static str,
    pub required: bool,
}

impl ParamSpec {
    const fn required_string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            param_type: ParamType::String,
            description,
            required: true,
        }
    }
}

/// A capability the assistant can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
}

impl ToolDescriptor {
    /// JSON schema object for the `parameters` field.
    pub fn parameters_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in self.params {
            properties.insert(
                param.name.to_string(),
                json!({
                    "type": param.param_type.as_str(),
                    "description": param.description,
                }),
            );
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Wire form used in `session.update`.
    pub fn to_tool_def(&self) -> ToolDef {
        ToolDef {
            tool_type: "function".to_string(),
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            parameters: Some(self.parameters_schema()),
        }
    }
}

pub const GET_EMPLOYEE_BY_NAME: &str = "getEmployeeByName";
pub const GET_EMPLOYEES_BY_DESIGNATION: &str = "getEmployeesByDesignation";
pub const GET_EMPLOYEES_BY_DEPARTMENT: &str = "getEmployeesByDepartment";
pub const GET_ALL_EMPLOYEES: &str = "getAllEmployees";
pub const GET_COMPANY_INFO: &str = "getCompanyInfo";
pub const GET_SERVICE_INFO: &str = "getServiceInfo";
pub const GET_FAQS_BY_CATEGORY: &str = "getFaqsByCategory";
pub const SEARCH_FAQS: &str = "searchFaqs";
pub const CREATE_BOOKING: &str = "createBooking";

/// Every tool the dispatcher can execute.
pub static TOOL_CATALOGUE: &[ToolDescriptor] = &[
    ToolDescriptor {
        name: GET_EMPLOYEE_BY_NAME,
        description: "Look up employees whose name contains the given text",
        params: &[ParamSpec::required_string(
            "name",
            "Full or partial employee name",
        )],
    },
    ToolDescriptor {
        name: GET_EMPLOYEES_BY_DESIGNATION,
        description: "List employees holding a given job title",
        params: &[ParamSpec::required_string(
            "designation",
            "Job title, e.g. 'Software Engineer'",
        )],
    },
    ToolDescriptor {
        name: GET_EMPLOYEES_BY_DEPARTMENT,
        description: "List employees working in a department",
        params: &[ParamSpec::required_string(
            "department",
            "Department name, e.g. 'Engineering'",
        )],
    },
    ToolDescriptor {
        name: GET_ALL_EMPLOYEES,
        description: "List every employee with their role and contact address",
        params: &[],
    },
    ToolDescriptor {
        name: GET_COMPANY_INFO,
        description: "Company profile: description, headquarters and contact details",
        params: &[],
    },
    ToolDescriptor {
        name: GET_SERVICE_INFO,
        description: "Details of a service the company offers",
        params: &[ParamSpec::required_string(
            "service",
            "Full or partial service name",
        )],
    },
    ToolDescriptor {
        name: GET_FAQS_BY_CATEGORY,
        description: "Frequently asked questions in a category",
        params: &[ParamSpec::required_string(
            "category",
            "FAQ category, e.g. 'Pricing'",
        )],
    },
    ToolDescriptor {
        name: SEARCH_FAQS,
        description: "Search every FAQ question and answer for a keyword",
        params: &[ParamSpec::required_string("keyword", "Word or phrase to search for")],
    },
    ToolDescriptor {
        name: CREATE_BOOKING,
        description: "Book a meeting with the team for the caller",
        params: &[
            ParamSpec::required_string("name", "Caller's full name"),
            ParamSpec::required_string("email", "Caller's email address"),
            ParamSpec::required_string("phone", "Caller's phone number"),
        ],
    },
];

/// Look up a descriptor by tool name.
pub fn find_tool(name: &str) -> Option<&'static ToolDescriptor> {
    TOOL_CATALOGUE.iter().find(|d| d.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_names_are_unique() {
        let mut names: Vec<_> = TOOL_CATALOGUE.iter().map(|d| d.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), TOOL_CATALOGUE.len());
    }

    #[test]
    fn test_parameters_schema() {
        let schema = find_tool(CREATE_BOOKING).unwrap().parameters_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["email"]["type"], "string");
        assert_eq!(schema["required"], json!(["name", "email", "phone"]));

        let schema = find_tool(GET_ALL_EMPLOYEES).unwrap().parameters_schema();
        assert_eq!(schema["required"], json!([]));
        assert!(schema["properties"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_tool_def_wire_form() {
        let def = find_tool(SEARCH_FAQS).unwrap().to_tool_def();
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "function");
        assert_eq!(json["name"], "searchFaqs");
        assert_eq!(json["parameters"]["required"], json!(["keyword"]));
    }

    #[test]
    fn test_param_type_matches() {
        assert!(ParamType::String.matches(&json!("x")));
        assert!(!ParamType::String.matches(&json!(1)));
        assert!(ParamType::Number.matches(&json!(1.5)));
        assert!(ParamType::Boolean.matches(&json!(false)));
    }

    #[test]
    fn test_find_unknown_tool() {
        assert!(find_tool("deleteEverything").is_none());
    }
}
