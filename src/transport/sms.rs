use std::collections::BTreeMap;

use crate::domain::{CodeSms, SmsMessage, SmsUser, TemplateSms, VoiceSms};
use crate::transport::params::ParameterSet;
use crate::transport::{EncodingError, to_json};

/// Build the unsigned request parameters for a (validated) SMS.
///
/// `timestamp_ms` is the request time in milliseconds since the Unix epoch.
/// The shared secret is never part of the returned set.
pub fn encode_sms_params(
    sms_user: &SmsUser,
    message: &SmsMessage,
    timestamp_ms: u64,
) -> Result<ParameterSet, EncodingError> {
    let mut params = ParameterSet::new();
    params.set(SmsUser::FIELD, sms_user.as_str());
    let timestamp = timestamp_ms.to_string();

    match message {
        SmsMessage::Template(sms) => push_template(&mut params, sms, timestamp)?,
        SmsMessage::Voice(sms) => push_voice(&mut params, sms, timestamp)?,
        SmsMessage::Code(sms) => push_code(&mut params, sms, timestamp)?,
    }

    Ok(params)
}

fn push_template(
    params: &mut ParameterSet,
    sms: &TemplateSms,
    timestamp: String,
) -> Result<(), EncodingError> {
    params.set("msgType", sms.msg_type.to_string());
    params.set("phone", sms.phone.as_str());
    params.set("templateId", sms.template_id.to_string());
    params.set("timestamp", timestamp);
    push_json_map(params, "vars", &sms.vars)?;
    params.set_non_zero("labelId", i64::from(sms.label_id));
    params.set_non_empty("sendRequestId", &sms.send_request_id);
    push_json_map(params, "tag", &sms.tag)
}

fn push_voice(
    params: &mut ParameterSet,
    sms: &VoiceSms,
    timestamp: String,
) -> Result<(), EncodingError> {
    params.set("phone", sms.phone.as_str());
    params.set("code", sms.code.as_str());
    params.set_non_zero("labelId", i64::from(sms.label_id));
    params.set_non_empty("sendRequestId", &sms.send_request_id);
    params.set("timestamp", timestamp);
    push_json_map(params, "tag", &sms.tag)
}

fn push_code(
    params: &mut ParameterSet,
    sms: &CodeSms,
    timestamp: String,
) -> Result<(), EncodingError> {
    params.set("msgType", sms.msg_type.to_string());
    params.set("phone", sms.phone.as_str());
    params.set_non_zero("signId", i64::from(sms.sign_id));
    params.set_non_empty("signName", &sms.sign_name);
    params.set("code", sms.code.as_str());
    params.set_non_zero("labelId", i64::from(sms.label_id));
    params.set_non_empty("sendRequestId", &sms.send_request_id);
    params.set("timestamp", timestamp);
    push_json_map(params, "tag", &sms.tag)
}

fn push_json_map(
    params: &mut ParameterSet,
    field: &'static str,
    map: &BTreeMap<String, String>,
) -> Result<(), EncodingError> {
    if !map.is_empty() {
        params.set(field, to_json(field, map)?);
    }
    Ok(())
}
