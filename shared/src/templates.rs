//! Static CSV templates offered as downloads next to the upload controls

/// Columns a bulk insert file must carry (`status` is optional)
pub const MEMBER_IMPORT_COLUMNS: [&str; 4] = ["name", "member_number", "id_number", "zone"];

/// Key column of a bulk update file
pub const MEMBER_UPDATE_KEY: &str = "member_number";

pub const MEMBER_TEMPLATE_FILENAME: &str = "member_template.csv";

pub const MEMBER_TEMPLATE_CSV: &str = "name,member_number,id_number,zone,status\n\
John Doe,M001,12345678,Zone A,active\n\
Jane Smith,M002,87654321,Zone B,active";

pub const BULK_UPDATE_TEMPLATE_FILENAME: &str = "bulk_update_template.csv";

/// Blank cells leave the stored value unchanged
pub const BULK_UPDATE_TEMPLATE_CSV: &str = "member_number,name,id_number,zone,status\n\
M001,John Doe Updated,,Zone C,\n\
M002,,,Zone D,active\n\
M003,Jane Smith,98765432,,dormant";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_template_header_lists_required_columns() {
        let header = MEMBER_TEMPLATE_CSV.lines().next().unwrap();
        for column in MEMBER_IMPORT_COLUMNS {
            assert!(header.split(',').any(|c| c == column), "missing {column}");
        }
    }

    #[test]
    fn update_template_is_keyed_by_member_number() {
        let header = BULK_UPDATE_TEMPLATE_CSV.lines().next().unwrap();
        assert!(header.starts_with(MEMBER_UPDATE_KEY));
        assert_eq!(BULK_UPDATE_TEMPLATE_CSV.lines().count(), 4);
    }
}
