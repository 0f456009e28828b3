use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

/// Database model for call disposition enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "disposition")]
pub enum Disposition {
    #[sqlx(rename = "interested")]
    Interested,
    #[sqlx(rename = "not interested")]
    NotInterested,
    #[sqlx(rename = "needs to call back")]
    NeedsToCallBack,
    #[sqlx(rename = "switched off")]
    SwitchedOff,
    #[sqlx(rename = "ringing no response")]
    RingingNoResponse,
    #[sqlx(rename = "follow-up")]
    FollowUp,
    #[sqlx(rename = "invalid number")]
    InvalidNumber,
    #[sqlx(rename = "whatsapp number")]
    WhatsappNumber,
    #[sqlx(rename = "converted")]
    Converted,
    #[sqlx(rename = "referral")]
    Referral,
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Disposition::Interested => write!(f, "interested"),
            Disposition::NotInterested => write!(f, "not interested"),
            Disposition::NeedsToCallBack => write!(f, "needs to call back"),
            Disposition::SwitchedOff => write!(f, "switched off"),
            Disposition::RingingNoResponse => write!(f, "ringing no response"),
            Disposition::FollowUp => write!(f, "follow-up"),
            Disposition::InvalidNumber => write!(f, "invalid number"),
            Disposition::WhatsappNumber => write!(f, "whatsapp number"),
            Disposition::Converted => write!(f, "converted"),
            Disposition::Referral => write!(f, "referral"),
        }
    }
}

impl FromStr for Disposition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interested" => Ok(Disposition::Interested),
            "not interested" => Ok(Disposition::NotInterested),
            "needs to call back" => Ok(Disposition::NeedsToCallBack),
            "switched off" => Ok(Disposition::SwitchedOff),
            "ringing no response" => Ok(Disposition::RingingNoResponse),
            "follow-up" => Ok(Disposition::FollowUp),
            "invalid number" => Ok(Disposition::InvalidNumber),
            "whatsapp number" => Ok(Disposition::WhatsappNumber),
            "converted" => Ok(Disposition::Converted),
            "referral" => Ok(Disposition::Referral),
            _ => Err(()),
        }
    }
}

impl Serialize for Disposition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Disposition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Disposition::from_str(&value)
            .map_err(|_| serde::de::Error::custom(format!("Invalid Disposition: {value}")))
    }
}

/// Database model for calling-code enum (tele-calling outcome shorthand)
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "calling_code")]
pub enum CallingCode {
    #[sqlx(rename = "wn")]
    Wn,
    #[sqlx(rename = "nc")]
    Nc,
    #[sqlx(rename = "cb")]
    Cb,
    #[sqlx(rename = "ptp")]
    Ptp,
    #[sqlx(rename = "rtp")]
    Rtp,
}

impl std::fmt::Display for CallingCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CallingCode::Wn => write!(f, "wn"),
            CallingCode::Nc => write!(f, "nc"),
            CallingCode::Cb => write!(f, "cb"),
            CallingCode::Ptp => write!(f, "ptp"),
            CallingCode::Rtp => write!(f, "rtp"),
        }
    }
}

impl FromStr for CallingCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wn" => Ok(CallingCode::Wn),
            "nc" => Ok(CallingCode::Nc),
            "cb" => Ok(CallingCode::Cb),
            "ptp" => Ok(CallingCode::Ptp),
            "rtp" => Ok(CallingCode::Rtp),
            _ => Err(()),
        }
    }
}

impl Serialize for CallingCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for CallingCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        CallingCode::from_str(&value)
            .map_err(|_| serde::de::Error::custom(format!("Invalid CallingCode: {value}")))
    }
}

/// Database model for field-visit code enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "field_code")]
pub enum FieldCode {
    #[sqlx(rename = "anf")]
    Anf,
    #[sqlx(rename = "skip")]
    Skip,
    #[sqlx(rename = "rtp")]
    Rtp,
    #[sqlx(rename = "revisit")]
    Revisit,
    #[sqlx(rename = "ptp")]
    Ptp,
}

impl std::fmt::Display for FieldCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldCode::Anf => write!(f, "anf"),
            FieldCode::Skip => write!(f, "skip"),
            FieldCode::Rtp => write!(f, "rtp"),
            FieldCode::Revisit => write!(f, "revisit"),
            FieldCode::Ptp => write!(f, "ptp"),
        }
    }
}

impl FromStr for FieldCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anf" => Ok(FieldCode::Anf),
            "skip" => Ok(FieldCode::Skip),
            "rtp" => Ok(FieldCode::Rtp),
            "revisit" => Ok(FieldCode::Revisit),
            "ptp" => Ok(FieldCode::Ptp),
            _ => Err(()),
        }
    }
}

impl Serialize for FieldCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FieldCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        FieldCode::from_str(&value)
            .map_err(|_| serde::de::Error::custom(format!("Invalid FieldCode: {value}")))
    }
}

/// Database model for follow-up stage enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "followup_stage")]
pub enum FollowupStage {
    #[sqlx(rename = "followup-1")]
    Followup1,
    #[sqlx(rename = "followup-2")]
    Followup2,
    #[sqlx(rename = "followup-3")]
    Followup3,
    #[sqlx(rename = "followup-4")]
    Followup4,
    #[sqlx(rename = "followup-5")]
    Followup5,
}

impl std::fmt::Display for FollowupStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FollowupStage::Followup1 => write!(f, "followup-1"),
            FollowupStage::Followup2 => write!(f, "followup-2"),
            FollowupStage::Followup3 => write!(f, "followup-3"),
            FollowupStage::Followup4 => write!(f, "followup-4"),
            FollowupStage::Followup5 => write!(f, "followup-5"),
        }
    }
}

impl FromStr for FollowupStage {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "followup-1" => Ok(FollowupStage::Followup1),
            "followup-2" => Ok(FollowupStage::Followup2),
            "followup-3" => Ok(FollowupStage::Followup3),
            "followup-4" => Ok(FollowupStage::Followup4),
            "followup-5" => Ok(FollowupStage::Followup5),
            _ => Err(()),
        }
    }
}

impl Serialize for FollowupStage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FollowupStage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        FollowupStage::from_str(&value)
            .map_err(|_| serde::de::Error::custom(format!("Invalid FollowupStage: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_core_api::domain::validation::coerce_enum;

    #[test]
    fn disposition_round_trips_through_its_token() {
        for value in [
            Disposition::Interested,
            Disposition::NotInterested,
            Disposition::NeedsToCallBack,
            Disposition::SwitchedOff,
            Disposition::RingingNoResponse,
            Disposition::FollowUp,
            Disposition::InvalidNumber,
            Disposition::WhatsappNumber,
            Disposition::Converted,
            Disposition::Referral,
        ] {
            assert_eq!(Disposition::from_str(&value.to_string()), Ok(value));
        }
    }

    #[test]
    fn invalid_disposition_coerces_to_default() {
        // Invalid enum input degrades to the default rather than rejecting
        // the record; this pins the observed behavior.
        assert_eq!(coerce_enum::<Disposition>(Some("very interested"), None), None);
        assert_eq!(
            coerce_enum::<Disposition>(Some("  Converted "), None),
            Some(Disposition::Converted)
        );
    }

    #[test]
    fn code_enums_parse_their_tokens() {
        assert_eq!(CallingCode::from_str("ptp"), Ok(CallingCode::Ptp));
        assert_eq!(FieldCode::from_str("revisit"), Ok(FieldCode::Revisit));
        assert_eq!(FollowupStage::from_str("followup-3"), Ok(FollowupStage::Followup3));
        assert!(CallingCode::from_str("PTP").is_err());
    }
}
