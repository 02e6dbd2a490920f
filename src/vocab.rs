//! Well-known vocabulary IRIs used during term resolution.

pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const PROPERTY: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Property";
    pub const LIST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#List";
}

pub mod rdfs {
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
    pub const CLASS: &str = "http://www.w3.org/2000/01/rdf-schema#Class";
    pub const RESOURCE: &str = "http://www.w3.org/2000/01/rdf-schema#Resource";
    pub const SUB_CLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
    pub const SUB_PROPERTY_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subPropertyOf";
    pub const DATATYPE: &str = "http://www.w3.org/2000/01/rdf-schema#Datatype";
    pub const LITERAL: &str = "http://www.w3.org/2000/01/rdf-schema#Literal";
    pub const SEE_ALSO: &str = "http://www.w3.org/2000/01/rdf-schema#seeAlso";
    pub const IS_DEFINED_BY: &str = "http://www.w3.org/2000/01/rdf-schema#isDefinedBy";
}

pub mod owl {
    pub const NS: &str = "http://www.w3.org/2002/07/owl#";
    pub const ONTOLOGY: &str = "http://www.w3.org/2002/07/owl#Ontology";
    pub const CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
    pub const OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
    pub const NAMED_INDIVIDUAL: &str = "http://www.w3.org/2002/07/owl#NamedIndividual";
    pub const ANNOTATION_PROPERTY: &str = "http://www.w3.org/2002/07/owl#AnnotationProperty";
    pub const DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";
}

pub mod xsd {
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";
}

pub mod skos {
    pub const CONCEPT: &str = "http://www.w3.org/2004/02/skos/core#Concept";
    pub const DEFINITION: &str = "http://www.w3.org/2004/02/skos/core#definition";
}

pub mod skosxl {
    pub const NS: &str = "http://www.w3.org/2008/05/skos-xl#";
    pub const LABEL: &str = "http://www.w3.org/2008/05/skos-xl#Label";
    pub const LITERAL_FORM: &str = "http://www.w3.org/2008/05/skos-xl#literalForm";
}

/// Types the generator itself defines for vocabulary constants.
pub mod artifact_generator {
    pub const NS: &str = "https://inrupt.com/vocab/tool/artifact_generator/";
    pub const CONSTANT_STRING: &str = "https://inrupt.com/vocab/tool/artifact_generator/ConstantString";
    pub const CONSTANT_IRI: &str = "https://inrupt.com/vocab/tool/artifact_generator/ConstantIri";
}

pub mod schema {
    pub const ALTERNATE_NAME: &str = "https://schema.org/alternateName";
    pub const PAYMENT_STATUS_TYPE: &str = "https://schema.org/PaymentStatusType";
}

pub mod vann {
    pub const PREFERRED_NAMESPACE_PREFIX: &str = "http://purl.org/vocab/vann/preferredNamespacePrefix";
    pub const PREFERRED_NAMESPACE_URI: &str = "http://purl.org/vocab/vann/preferredNamespaceUri";
}

pub mod dcterms {
    pub const DESCRIPTION: &str = "http://purl.org/dc/terms/description";
    pub const TITLE: &str = "http://purl.org/dc/terms/title";
    pub const CREATOR: &str = "http://purl.org/dc/terms/creator";
}

pub mod dc {
    pub const TITLE: &str = "http://purl.org/dc/elements/1.1/title";
}

/// `rdf:type` objects that make a subject a class.
pub const CLASS_TYPES: [&str; 4] = [
    rdfs::CLASS,
    owl::CLASS,
    skos::CONCEPT,
    schema::PAYMENT_STATUS_TYPE,
];

/// `rdf:type` objects that make a subject a property.
pub const PROPERTY_TYPES: [&str; 9] = [
    rdfs::RESOURCE,
    rdf::PROPERTY,
    rdf::LIST,
    rdfs::DATATYPE,
    owl::OBJECT_PROPERTY,
    owl::NAMED_INDIVIDUAL,
    owl::ANNOTATION_PROPERTY,
    owl::DATATYPE_PROPERTY,
    skosxl::LABEL,
];

/// `rdf:type` objects that make a subject a literal.
pub const LITERAL_TYPES: [&str; 1] = [rdfs::LITERAL];

/// `rdf:type` objects that make a subject a string constant.
pub const CONSTANT_STRING_TYPES: [&str; 1] = [artifact_generator::CONSTANT_STRING];

/// `rdf:type` objects that make a subject an IRI constant.
pub const CONSTANT_IRI_TYPES: [&str; 1] = [artifact_generator::CONSTANT_IRI];

/// Namespaces whose terms may be described by any vocabulary. Subjects in them are skipped
/// rather than reported as outside the vocabulary namespace.
pub const WELL_KNOWN_NAMESPACES: [&str; 4] = [rdf::NS, rdfs::NS, owl::NS, xsd::NS];

/// Vocabulary description predicates, most specific first.
pub const DESCRIPTION_PREDICATES: [&str; 6] = [
    dcterms::DESCRIPTION,
    dcterms::TITLE,
    rdfs::COMMENT,
    dc::TITLE,
    skos::DEFINITION,
    rdfs::LABEL,
];
