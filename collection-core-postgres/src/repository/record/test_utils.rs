use chrono::Utc;
use collection_core_api::domain::changelog::FieldChange;
use collection_core_db::models::record::common_enums::Disposition;
use collection_core_db::models::record::customer_record::CustomerRecordModel;
use heapless::String as HeaplessString;

/// A minimal valid record with the given uid and primary number.
pub fn test_record(record_uid: &str, mobile: &str) -> CustomerRecordModel {
    let mut record = CustomerRecordModel::blank(
        HeaplessString::try_from("priya").unwrap(),
        Utc::now(),
    );
    record.record_uid = HeaplessString::try_from(record_uid).unwrap();
    record.mobile = HeaplessString::try_from(mobile).unwrap();
    record.customer_name = Some(HeaplessString::try_from("Asha Rao").unwrap());
    record.disposition = Some(Disposition::Interested);
    record
}

pub fn test_change(field: &str, old_value: Option<&str>, new_value: Option<&str>) -> FieldChange {
    FieldChange {
        field: field.to_string(),
        old_value: old_value.map(String::from),
        new_value: new_value.map(String::from),
    }
}

/// Random digit string for phone-style test values.
#[allow(dead_code)]
pub fn random_digits(len: usize) -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    (0..len).map(|_| char::from(b'0' + rng.gen_range(0..10))).collect()
}
