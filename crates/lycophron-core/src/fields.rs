//! Static field tables.
//!
//! Column order in these tables is the order written to CSV templates, so
//! entries must only ever be appended or removed, never sorted.

/// Column holding the local record identifier.
pub const ID_FIELD: &str = "id";
/// Column listing the files attached to a record.
pub const FILENAMES_FIELD: &str = "filenames";

/// Identity columns present in every template.
pub const CORE_FIELDS: &[&str] = &[ID_FIELD, FILENAMES_FIELD];

/// Deposit metadata columns present in every template.
pub const STANDARD_FIELDS: &[&str] = &[
    "resource_type.id",
    "creators.type",
    "creators.given_name",
    "creators.family_name",
    "creators.name",
    "creators.orcid",
    "creators.gnd",
    "creators.isni",
    "creators.ror",
    "creators.role.id",
    "creators.affiliations.id",
    "creators.affiliations.name",
    "title",
    "publication_date",
    "description",
    // additional descriptions
    "abstract.description",
    "method.description",
    "notes.description",
    "rights.id",
    "rights.title",
    "contributors.type",
    "contributors.given_name",
    "contributors.family_name",
    "contributors.name",
    "contributors.orcid",
    "contributors.gnd",
    "contributors.isni",
    "contributors.ror",
    "contributors.role.id",
    "contributors.affiliations.id",
    "contributors.affiliations.name",
    "subjects.subject",
    "languages.id",
    "version",
    "publisher",
    // schemes are guessed from the identifier value
    "identifiers.identifier",
    "related_identifiers.identifier",
    "related_identifiers.relation_type.id",
    "related_identifiers.resource_type.id",
    "references.reference",
    "default_community",
    "communities",
    "doi",
    "locations.lat",
    "locations.lon",
    "locations.place",
    "locations.description",
];

/// File access and embargo columns, only added on request.
pub const ACCESS_FIELDS: &[&str] = &[
    "access.files",
    "access.embargo.active",
    "access.embargo.until",
    "access.embargo.reason",
];

/// Namespace identifier to column prefix.
pub const NAMESPACE_PREFIXES: &[(&str, &str)] = &[
    ("journal", "journal"),
    ("meeting", "meeting"),
    ("imprint", "imprint"),
    ("thesis", "university"),
    ("dwc", "dwc"),
    ("gbif-dwc", "gbif-dwc"),
    ("ac", "ac"),
    ("dc", "dc"),
    ("openbiodiv", "openbiodiv"),
    ("obo", "obo"),
];

/// Namespace identifier to bare field names, in declaration order.
pub const NAMESPACE_FIELDS: &[(&str, &[&str])] = &[
    ("journal", &["title", "issue", "volume", "pages", "issn"]),
    (
        "meeting",
        &[
            "acronym",
            "dates",
            "place",
            "session_part",
            "session",
            "title",
            "url",
        ],
    ),
    ("imprint", &["title", "isbn", "pages", "place"]),
    ("thesis", &["thesis"]),
    (
        "dwc",
        &[
            "basisOfRecord",
            "catalogNumber",
            "class",
            "collectionCode",
            "country",
            "county",
            "dateIdentified",
            "decimalLatitude",
            "decimalLongitude",
            "eventDate",
            "family",
            "genus",
            "identifiedBy",
            "individualCount",
            "institutionCode",
            "kingdom",
            "lifeStage",
            "locality",
            "materialSampleID",
            "namePublishedInID",
            "namePublishedInYear",
            "order",
            "otherCatalogNumbers",
            "phylum",
            "preparations",
            "recordedBy",
            "scientificName",
            "scientificNameAuthorship",
            "scientificNameID",
            "sex",
            "specificEpithet",
            "stateProvince",
            "taxonID",
            "taxonRank",
            "taxonomicStatus",
            "typeStatus",
            "verbatimElevation",
            "verbatimEventDate",
        ],
    ),
    ("gbif-dwc", &["identifiedByID", "recordedByID"]),
    (
        "ac",
        &[
            "associatedSpecimenReference",
            "captureDevice",
            "physicalSetting",
            "resourceCreationTechnique",
            "subjectOrientation",
            "subjectPart",
        ],
    ),
    ("dc", &["creator", "rightsHolder"]),
    ("openbiodiv", &["TaxonomicConceptLabel"]),
    ("obo", &["RO_0002453"]),
];
