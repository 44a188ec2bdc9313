use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::FIELD_SEPARATOR;
use crate::error::{Error, Result};
use crate::fields::{
    ACCESS_FIELDS, CORE_FIELDS, NAMESPACE_FIELDS, NAMESPACE_PREFIXES, STANDARD_FIELDS,
};

/// A named group of fields sharing a column prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace<'a> {
    pub id: &'a str,
    pub prefix: &'a str,
    pub fields: &'a [&'a str],
}

impl Namespace<'_> {
    /// Field names qualified with the namespace prefix (`prefix.field`).
    pub fn qualified_fields(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|field| format!("{}{FIELD_SEPARATOR}{field}", self.prefix))
            .collect()
    }
}

/// Selection of optional field groups for a CSV template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRequest {
    pub include_access: bool,
    pub include_all: bool,
    pub custom_namespaces: Vec<String>,
}

impl TemplateRequest {
    /// Parse a comma-separated namespace list such as `dwc,ac,obo`.
    ///
    /// Items are trimmed and empty items are skipped; order and duplicates
    /// are kept as given.
    pub fn parse_namespace_list(list: &str) -> Vec<String> {
        list.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn with_custom_list(mut self, list: &str) -> Self {
        self.custom_namespaces = Self::parse_namespace_list(list);
        self
    }
}

/// Result of checking a header row against the catalog.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderReport {
    /// Unrecognized headers, in input order, duplicates included.
    pub invalid: Vec<String>,
}

impl HeaderReport {
    /// Returns true when every header was recognized.
    pub fn is_ok(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Immutable catalog of permissible CSV column names.
///
/// Built once from static tables and shared by reference; it never changes
/// after construction.
#[derive(Debug, Clone)]
pub struct FieldCatalog<'a> {
    core: &'a [&'a str],
    standard: &'a [&'a str],
    access: &'a [&'a str],
    namespaces: Vec<Namespace<'a>>,
    valid: HashSet<String>,
}

impl FieldCatalog<'static> {
    /// Catalog backed by the built-in deposit field tables.
    pub fn builtin() -> Self {
        FieldCatalog::new(
            CORE_FIELDS,
            STANDARD_FIELDS,
            ACCESS_FIELDS,
            NAMESPACE_PREFIXES,
            NAMESPACE_FIELDS,
        )
    }
}

impl Default for FieldCatalog<'static> {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> FieldCatalog<'a> {
    /// Assemble a catalog from field tables.
    ///
    /// Namespaces keep the order of `namespace_fields`. A namespace without
    /// an entry in `prefixes` is left out and contributes no fields.
    pub fn new(
        core: &'a [&'a str],
        standard: &'a [&'a str],
        access: &'a [&'a str],
        prefixes: &'a [(&'a str, &'a str)],
        namespace_fields: &'a [(&'a str, &'a [&'a str])],
    ) -> Self {
        let namespaces: Vec<Namespace<'a>> = namespace_fields
            .iter()
            .filter_map(|(id, fields)| {
                prefixes
                    .iter()
                    .find(|(prefix_id, _)| prefix_id == id)
                    .map(|(_, prefix)| Namespace {
                        id: *id,
                        prefix: *prefix,
                        fields: *fields,
                    })
            })
            .collect();

        let mut valid: HashSet<String> = core
            .iter()
            .chain(standard.iter())
            .chain(access.iter())
            .map(|field| field.to_string())
            .collect();
        for namespace in &namespaces {
            valid.extend(namespace.qualified_fields());
        }

        Self {
            core,
            standard,
            access,
            namespaces,
            valid,
        }
    }

    /// Declared namespaces in declaration order.
    pub fn namespaces(&self) -> &[Namespace<'a>] {
        &self.namespaces
    }

    pub fn namespace(&self, id: &str) -> Option<&Namespace<'a>> {
        self.namespaces.iter().find(|namespace| namespace.id == id)
    }

    /// Compose the ordered header row for a template request.
    ///
    /// Unknown namespace identifiers add nothing. The result is never
    /// deduplicated.
    pub fn build_header_set(&self, req: &TemplateRequest) -> Vec<String> {
        let mut headers: Vec<String> = self
            .core
            .iter()
            .chain(self.standard.iter())
            .map(|field| field.to_string())
            .collect();

        if req.include_all {
            headers.extend(self.access.iter().map(|field| field.to_string()));
            for namespace in &self.namespaces {
                headers.extend(namespace.qualified_fields());
            }
            return headers;
        }

        if req.include_access {
            headers.extend(self.access.iter().map(|field| field.to_string()));
        }
        for id in &req.custom_namespaces {
            if let Some(namespace) = self.namespace(id) {
                headers.extend(namespace.qualified_fields());
            }
        }

        headers
    }

    /// Every permissible column in template order.
    pub fn all_fields(&self) -> Vec<String> {
        self.build_header_set(&TemplateRequest {
            include_all: true,
            ..TemplateRequest::default()
        })
    }

    pub fn is_valid_header(&self, header: &str) -> bool {
        self.valid.contains(header)
    }

    /// Headers from `actual` that are not in the catalog, in input order.
    ///
    /// Only unrecognized columns are reported; missing columns are not.
    pub fn validate_headers<S: AsRef<str>>(&self, actual: &[S]) -> Vec<String> {
        actual
            .iter()
            .filter(|header| !self.is_valid_header(header.as_ref()))
            .map(|header| header.as_ref().to_string())
            .collect()
    }

    pub fn check_headers<S: AsRef<str>>(&self, actual: &[S]) -> HeaderReport {
        HeaderReport {
            invalid: self.validate_headers(actual),
        }
    }

    /// Like [`FieldCatalog::check_headers`], failing on any invalid header.
    pub fn ensure_valid_headers<S: AsRef<str>>(&self, actual: &[S]) -> Result<()> {
        let report = self.check_headers(actual);
        if report.is_ok() {
            Ok(())
        } else {
            Err(Error::InvalidHeaders(report.invalid))
        }
    }

    /// Namespace identifiers from `ids` that the catalog does not declare.
    pub fn unknown_namespaces<S: AsRef<str>>(&self, ids: &[S]) -> Vec<String> {
        ids.iter()
            .filter(|id| self.namespace(id.as_ref()).is_none())
            .map(|id| id.as_ref().to_string())
            .collect()
    }

    /// Reject requests naming undeclared namespaces.
    pub fn ensure_known_namespaces(&self, req: &TemplateRequest) -> Result<()> {
        let unknown = self.unknown_namespaces(&req.custom_namespaces);
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(Error::UnknownNamespace(unknown))
        }
    }
}
