//! Static lookup tables for the EU DCC short claim codes and value sets.
//!
//! Value sets follow the eHealth Network DCC value set releases. Codes that
//! are not listed here are rendered unchanged.

pub type Table = &'static [(&'static str, &'static str)];

/// How the value behind a claim code is rendered.
#[derive(Debug, Clone, Copy)]
pub enum Values {
    Plain,
    Lookup(Table),
    /// A nested record (or array of records) with its own field table.
    Record(&'static [Field]),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub code: &'static str,
    pub label: &'static str,
    pub values: Values,
}

const fn field(code: &'static str, label: &'static str, values: Values) -> Field {
    Field {
        code,
        label,
        values,
    }
}

pub fn lookup(table: Table, code: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, label)| *label)
}

pub fn find_field(fields: &'static [Field], code: &str) -> Option<&'static Field> {
    fields.iter().find(|f| f.code == code)
}

pub fn country_name(code: &str) -> Option<&'static str> {
    lookup(COUNTRIES, code)
}

pub const DISEASES: Table = &[("840539006", "COVID-19")];

pub const VACCINE_TYPES: Table = &[
    ("1119305005", "SARS-CoV-2 antigen vaccine"),
    ("1119349007", "SARS-CoV-2 mRNA vaccine"),
    ("J07BX03", "covid-19 vaccines"),
];

pub const MEDICINAL_PRODUCTS: Table = &[
    ("EU/1/20/1528", "Comirnaty"),
    ("EU/1/20/1507", "Spikevax"),
    ("EU/1/21/1529", "Vaxzevria"),
    ("EU/1/20/1525", "COVID-19 Vaccine Janssen"),
    ("EU/1/21/1618", "Nuvaxovid"),
    ("CVnCoV", "CVnCoV"),
    ("Sputnik-V", "Sputnik-V"),
    ("Convidecia", "Convidecia"),
    ("EpiVacCorona", "EpiVacCorona"),
    ("BBIBP-CorV", "BBIBP-CorV"),
    ("CoronaVac", "CoronaVac"),
    ("Covaxin", "Covaxin (also known as BBV152 A, B, C)"),
];

pub const MANUFACTURERS: Table = &[
    ("ORG-100001699", "AstraZeneca AB"),
    ("ORG-100030215", "Biontech Manufacturing GmbH"),
    ("ORG-100001417", "Janssen-Cilag International"),
    ("ORG-100031184", "Moderna Biotech Spain S.L."),
    ("ORG-100006270", "Curevac AG"),
    ("ORG-100013793", "CanSino Biologics"),
    ("ORG-100020693", "China Sinopharm International Corp. - Beijing location"),
    ("ORG-100010771", "Sinopharm Weiqida Europe Pharmaceutical s.r.o. - Prague location"),
    ("ORG-100024420", "Sinopharm Zhijun (Shenzhen) Pharmaceutical Co. Ltd. - Shenzhen location"),
    ("ORG-100032020", "Novavax CZ AS"),
    ("Gamaleya-Research-Institute", "Gamaleya Research Institute"),
    ("Vector-Institute", "Vector Institute"),
    ("Sinovac-Biotech", "Sinovac Biotech"),
    ("Bharat-Biotech", "Bharat Biotech"),
];

pub const TEST_TYPES: Table = &[
    ("LP6464-4", "Nucleic acid amplification with probe detection"),
    ("LP217198-3", "Rapid immunoassay"),
];

pub const TEST_RESULTS: Table = &[
    ("260415000", "Not detected"),
    ("260373001", "Detected"),
];

pub const COUNTRIES: Table = &[
    ("AD", "Andorra"),
    ("AL", "Albania"),
    ("AM", "Armenia"),
    ("AT", "Austria"),
    ("BE", "Belgium"),
    ("BG", "Bulgaria"),
    ("CH", "Switzerland"),
    ("CY", "Cyprus"),
    ("CZ", "Czechia"),
    ("DE", "Germany"),
    ("DK", "Denmark"),
    ("EE", "Estonia"),
    ("ES", "Spain"),
    ("FI", "Finland"),
    ("FO", "Faroe Islands"),
    ("FR", "France"),
    ("GB", "United Kingdom"),
    ("GR", "Greece"),
    ("HR", "Croatia"),
    ("HU", "Hungary"),
    ("IE", "Ireland"),
    ("IL", "Israel"),
    ("IS", "Iceland"),
    ("IT", "Italy"),
    ("LI", "Liechtenstein"),
    ("LT", "Lithuania"),
    ("LU", "Luxembourg"),
    ("LV", "Latvia"),
    ("MA", "Morocco"),
    ("MC", "Monaco"),
    ("MK", "North Macedonia"),
    ("MT", "Malta"),
    ("NL", "Netherlands"),
    ("NO", "Norway"),
    ("PA", "Panama"),
    ("PL", "Poland"),
    ("PT", "Portugal"),
    ("RO", "Romania"),
    ("RS", "Serbia"),
    ("SE", "Sweden"),
    ("SI", "Slovenia"),
    ("SK", "Slovakia"),
    ("SM", "San Marino"),
    ("TR", "Turkey"),
    ("UA", "Ukraine"),
    ("VA", "Holy See"),
];

pub const NAME_FIELDS: &[Field] = &[
    field("fn", "family_name", Values::Plain),
    field("fnt", "family_name_standardised", Values::Plain),
    field("gn", "given_name", Values::Plain),
    field("gnt", "given_name_standardised", Values::Plain),
];

pub const VACCINATION_FIELDS: &[Field] = &[
    field("tg", "targeted_disease", Values::Lookup(DISEASES)),
    field("vp", "vaccine_prophylaxis", Values::Lookup(VACCINE_TYPES)),
    field("mp", "medicinal_product", Values::Lookup(MEDICINAL_PRODUCTS)),
    field("ma", "manufacturer", Values::Lookup(MANUFACTURERS)),
    field("dn", "dose_number", Values::Plain),
    field("sd", "total_doses", Values::Plain),
    field("dt", "vaccination_date", Values::Plain),
    field("co", "country", Values::Lookup(COUNTRIES)),
    field("is", "certificate_issuer", Values::Plain),
    field("ci", "certificate_id", Values::Plain),
];

pub const TEST_FIELDS: &[Field] = &[
    field("tg", "targeted_disease", Values::Lookup(DISEASES)),
    field("tt", "test_type", Values::Lookup(TEST_TYPES)),
    field("nm", "test_name", Values::Plain),
    field("ma", "test_device", Values::Plain),
    field("sc", "sample_collected", Values::Plain),
    field("tr", "test_result", Values::Lookup(TEST_RESULTS)),
    field("tc", "testing_centre", Values::Plain),
    field("co", "country", Values::Lookup(COUNTRIES)),
    field("is", "certificate_issuer", Values::Plain),
    field("ci", "certificate_id", Values::Plain),
];

pub const RECOVERY_FIELDS: &[Field] = &[
    field("tg", "targeted_disease", Values::Lookup(DISEASES)),
    field("fr", "first_positive_result", Values::Plain),
    field("co", "country", Values::Lookup(COUNTRIES)),
    field("is", "certificate_issuer", Values::Plain),
    field("df", "valid_from", Values::Plain),
    field("du", "valid_until", Values::Plain),
    field("ci", "certificate_id", Values::Plain),
];

pub const CERTIFICATE_FIELDS: &[Field] = &[
    field("nam", "name", Values::Record(NAME_FIELDS)),
    field("dob", "date_of_birth", Values::Plain),
    field("v", "vaccinations", Values::Record(VACCINATION_FIELDS)),
    field("t", "tests", Values::Record(TEST_FIELDS)),
    field("r", "recoveries", Values::Record(RECOVERY_FIELDS)),
    field("ver", "schema_version", Values::Plain),
];
