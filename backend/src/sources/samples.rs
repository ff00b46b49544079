//! Sample inputs: an invoice letter and three recipients to merge it with.

use crate::error::LoadError;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

pub const SAMPLE_DATA_FILE: &str = "Sample_Data.csv";
pub const SAMPLE_TEMPLATE_FILE: &str = "Sample_Template.md";

const HEADER: [&str; 10] = [
    "First Name",
    "Last Name",
    "Email",
    "CC Email",
    "Account Manager",
    "Invoice Number",
    "Service Date",
    "Description",
    "Amount Due",
    "Due Date",
];

const ROWS: [[&str; 10]; 3] = [
    [
        "Jane",
        "Smith",
        "jane.smith@example.com",
        "billing.cc@example.com",
        "Sarah",
        "INV-1001",
        "2026-01-15",
        "Web Hosting Services",
        "$150.00",
        "2026-02-15",
    ],
    [
        "John",
        "Doe",
        "john.doe@example.com",
        "",
        "Michael",
        "INV-1002",
        "2026-01-18",
        "Annual Consulting",
        "$450.00",
        "2026-02-18",
    ],
    [
        "Alice",
        "Johnson",
        "alice.j@example.com",
        "",
        "Sarah",
        "INV-1003",
        "2026-01-20",
        "Software Licensing",
        "$99.00",
        "2026-02-20",
    ],
];

const TEMPLATE: &str = "Dear {{First Name}} {{Last Name}},

Thank you for your continued business with Acme Corporation. This is an automated notification regarding your recent account activity.

Below are the details of your latest invoice:

| Invoice Number | Service Date | Description | Amount Due | Due Date |
|---|---|---|---|---|
| {{Invoice Number}} | {{Service Date}} | {{Description}} | {{Amount Due}} | {{Due Date}} |

Please ensure payment is completed by {{Due Date}}. If you have any questions, your account manager, {{Account Manager}}, will be happy to assist you.

Best Regards,

Billing Department

Acme Corporation

Email: billing@acmecorp.example.com

Phone: +1 800-555-0199
";

/// Where `write_samples` put the two files.
#[derive(Debug, Clone)]
pub struct SampleFiles {
    pub data: PathBuf,
    pub template: PathBuf,
}

/// Writes the sample data and template into `dir`, replacing earlier copies.
pub fn write_samples(dir: &Path) -> Result<SampleFiles, LoadError> {
    fs::create_dir_all(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let data = dir.join(SAMPLE_DATA_FILE);
    let mut writer = csv::Writer::from_path(&data)?;
    writer.write_record(HEADER)?;
    for row in ROWS {
        writer.write_record(row)?;
    }
    writer.flush().map_err(|source| LoadError::Io {
        path: data.clone(),
        source,
    })?;

    let template = dir.join(SAMPLE_TEMPLATE_FILE);
    fs::write(&template, TEMPLATE).map_err(|source| LoadError::Io {
        path: template.clone(),
        source,
    })?;

    info!("Sample files written to {}", dir.display());
    Ok(SampleFiles { data, template })
}
