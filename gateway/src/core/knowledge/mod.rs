//! Read-only knowledge base backing the assistant's tools.
//!
//! Three datasets are loaded once at startup and never mutated afterwards:
//! - `employees.json` - employee directory
//! - `company.json` - company profile and service catalogue
//! - `faqs.json` - FAQ entries grouped by category
//!
//! Use [`KnowledgeBase::load_from_dir`] to read the datasets from disk, or
//! [`KnowledgeBase::builtin`] for the copies compiled into the binary.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const BUILTIN_EMPLOYEES: &str = include_str!("../../../data/employees.json");
const BUILTIN_COMPANY: &str = include_str!("../../../data/company.json");
const BUILTIN_FAQS: &str = include_str!("../../../data/faqs.json");

const EMPLOYEES_FILE: &str = "employees.json";
const COMPANY_FILE: &str = "company.json";
const FAQS_FILE: &str = "faqs.json";

/// Errors raised while loading datasets.
#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {dataset}: {source}")]
    Parse {
        dataset: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// An entry in the employee directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub name: String,
    pub designation: String,
    pub department: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Reduced projection returned by "list all" queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeSummary {
    pub name: String,
    pub role: String,
    pub contact: String,
}

impl From<&Employee> for EmployeeSummary {
    fn from(employee: &Employee) -> Self {
        Self {
            name: employee.name.clone(),
            role: employee.designation.clone(),
            contact: employee.email.clone(),
        }
    }
}

/// A service offered by the company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    pub description: String,
}

/// Company profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    pub description: String,
    pub founded: String,
    pub headquarters: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub services: Vec<Service>,
}

/// A single question/answer pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// FAQ entries sharing a category label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqCategory {
    pub category: String,
    pub faqs: Vec<Faq>,
}

/// A keyword search hit, tagged with the category it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaqMatch {
    pub category: String,
    pub question: String,
    pub answer: String,
}

/// In-memory datasets. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    employees: Vec<Employee>,
    company: CompanyProfile,
    faq_categories: Vec<FaqCategory>,
}

/// Case-insensitive substring test.
#[inline]
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl KnowledgeBase {
    pub fn new(
        employees: Vec<Employee>,
        company: CompanyProfile,
        faq_categories: Vec<FaqCategory>,
    ) -> Self {
        Self {
            employees,
            company,
            faq_categories,
        }
    }

    /// Datasets compiled into the binary.
    pub fn builtin() -> Result<Self, KnowledgeBaseError> {
        Self::from_json(BUILTIN_EMPLOYEES, BUILTIN_COMPANY, BUILTIN_FAQS)
    }

    /// Load the three dataset files from `dir`.
    pub fn load_from_dir(dir: &Path) -> Result<Self, KnowledgeBaseError> {
        let read = |file: &str| {
            let path = dir.join(file);
            fs::read_to_string(&path).map_err(|source| KnowledgeBaseError::Io {
                path: path.display().to_string(),
                source,
            })
        };

        Self::from_json(&read(EMPLOYEES_FILE)?, &read(COMPANY_FILE)?, &read(FAQS_FILE)?)
    }

    /// Parse the three datasets from JSON text.
    pub fn from_json(
        employees: &str,
        company: &str,
        faqs: &str,
    ) -> Result<Self, KnowledgeBaseError> {
        let employees = serde_json::from_str(employees).map_err(|source| {
            KnowledgeBaseError::Parse {
                dataset: EMPLOYEES_FILE,
                source,
            }
        })?;
        let company = serde_json::from_str(company).map_err(|source| KnowledgeBaseError::Parse {
            dataset: COMPANY_FILE,
            source,
        })?;
        let faq_categories =
            serde_json::from_str(faqs).map_err(|source| KnowledgeBaseError::Parse {
                dataset: FAQS_FILE,
                source,
            })?;

        Ok(Self::new(employees, company, faq_categories))
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn company(&self) -> &CompanyProfile {
        &self.company
    }

    pub fn faq_categories(&self) -> &[FaqCategory] {
        &self.faq_categories
    }

    /// Every employee whose name contains `name`.
    pub fn employees_by_name(&self, name: &str) -> Vec<&Employee> {
        self.employees
            .iter()
            .filter(|e| contains_ci(&e.name, name))
            .collect()
    }

    /// Every employee whose designation contains `designation`.
    pub fn employees_by_designation(&self, designation: &str) -> Vec<&Employee> {
        self.employees
            .iter()
            .filter(|e| contains_ci(&e.designation, designation))
            .collect()
    }

    /// Every employee whose department contains `department`.
    pub fn employees_by_department(&self, department: &str) -> Vec<&Employee> {
        self.employees
            .iter()
            .filter(|e| contains_ci(&e.department, department))
            .collect()
    }

    pub fn employee_summaries(&self) -> Vec<EmployeeSummary> {
        self.employees.iter().map(EmployeeSummary::from).collect()
    }

    /// Services whose name contains `service`.
    pub fn services_matching(&self, service: &str) -> Vec<&Service> {
        self.company
            .services
            .iter()
            .filter(|s| contains_ci(&s.name, service))
            .collect()
    }

    /// Categories whose label contains `category`.
    pub fn faq_categories_matching(&self, category: &str) -> Vec<&FaqCategory> {
        self.faq_categories
            .iter()
            .filter(|c| contains_ci(&c.category, category))
            .collect()
    }

    /// FAQs whose question or answer contains `keyword`, across all categories.
    pub fn search_faqs(&self, keyword: &str) -> Vec<FaqMatch> {
        let needle = keyword.to_lowercase();
        self.faq_categories
            .iter()
            .flat_map(|category| {
                let needle = needle.clone();
                category.faqs.iter().filter_map(move |faq| {
                    let hit = faq.question.to_lowercase().contains(&needle)
                        || faq.answer.to_lowercase().contains(&needle);
                    hit.then(|| FaqMatch {
                        category: category.category.clone(),
                        question: faq.question.clone(),
                        answer: faq.answer.clone(),
                    })
                })
            })
            .collect()
    }
}
