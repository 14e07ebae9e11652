use chrono::NaiveDateTime;

use crate::domain::{
    ApiKey, ApiUser, MailBody, MailCalendar, MailMessage, MailReceiver, TextContent,
};
use crate::transport::params::ParameterSet;
use crate::transport::{EncodingError, to_json};

const CALENDAR_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const ATTACHMENTS_FIELD: &str = "attachments";

/// Build the request parameters for a (validated) mail.
///
/// Field order: credentials, receiver, body (attachments as file parts), content.
/// Attachment readers are drained here; the returned set carries file parts
/// whenever the mail had attachments.
pub fn encode_mail_params(
    api_user: &ApiUser,
    api_key: &ApiKey,
    message: MailMessage<'_>,
) -> Result<ParameterSet, EncodingError> {
    let mut params = ParameterSet::new();
    params.set(ApiUser::FIELD, api_user.as_str());
    params.set(ApiKey::FIELD, api_key.as_str());

    match message {
        MailMessage::Common(mail) => {
            push_receiver(&mut params, &mail.receiver);
            push_body(&mut params, mail.body)?;
            push_text_content(&mut params, &mail.content);
        }
        MailMessage::Template(mail) => {
            push_receiver(&mut params, &mail.receiver);
            push_body(&mut params, mail.body)?;
            params.set("templateInvokeName", mail.content.template_invoke_name);
        }
        MailMessage::Calendar(mail) => {
            push_receiver(&mut params, &mail.receiver);
            push_body(&mut params, mail.body)?;
            push_text_content(&mut params, &mail.content);
            push_calendar(&mut params, &mail.calendar);
        }
    }

    Ok(params)
}

fn push_receiver(params: &mut ParameterSet, receiver: &MailReceiver) {
    params.set_non_empty("to", &receiver.to);
    params.set_non_empty("cc", &receiver.cc);
    params.set_non_empty("bcc", &receiver.bcc);
    params.set_flag("useAddressList", receiver.use_address_list);
}

fn push_body(params: &mut ParameterSet, body: MailBody<'_>) -> Result<(), EncodingError> {
    params.set("from", body.from);
    params.set("subject", body.subject);
    params.set_non_empty("contentSummary", &body.content_summary);
    params.set_non_empty("fromName", &body.from_name);
    params.set_non_empty("replyTo", &body.reply_to);
    params.set_non_empty("labelName", &body.label_name);
    if !body.headers.is_empty() {
        params.set("headers", to_json("headers", &body.headers)?);
    }

    for mut attachment in body.attachments {
        let mut content = Vec::new();
        attachment
            .reader()
            .read_to_end(&mut content)
            .map_err(|source| EncodingError::Attachment {
                name: attachment.name().to_owned(),
                source,
            })?;
        params.push_file(ATTACHMENTS_FIELD, attachment.name(), content);
    }

    if !body.xsmtpapi.is_empty() {
        params.set("xsmtpapi", to_json("xsmtpapi", &body.xsmtpapi)?);
    }
    params.set_non_empty("sendRequestId", &body.send_request_id);
    params.set_flag("respEmailId", body.resp_email_id);
    params.set_flag("useNotification", body.use_notification);
    Ok(())
}

fn push_text_content(params: &mut ParameterSet, content: &TextContent) {
    params.set_non_empty("html", &content.html);
    params.set_non_empty("plain", &content.plain);
}

fn push_calendar(params: &mut ParameterSet, calendar: &MailCalendar) {
    params.set("startTime", format_time(calendar.start_time));
    params.set("endTime", format_time(calendar.end_time));
    params.set("title", calendar.title.as_str());
    params.set("organizerName", calendar.organizer_name.as_str());
    params.set("organizerEmail", calendar.organizer_email.as_str());
    params.set("location", calendar.location.as_str());
    params.set_non_empty("description", &calendar.description);
    params.set("participatorNames", calendar.participator_names.as_str());
    params.set_non_empty("participatorEmails", &calendar.participator_emails);
    params.set_non_empty("uid", &calendar.uid);
    params.set_flag("isCancel", calendar.is_cancel);
    params.set_flag("isUpdate", calendar.is_update);
    params.set_non_zero("valarmTime", i64::from(calendar.valarm_time));
}

fn format_time(time: Option<NaiveDateTime>) -> String {
    time.map(|it| it.format(CALENDAR_TIME_FORMAT).to_string())
        .unwrap_or_default()
}
