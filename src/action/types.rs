use serde::Serialize;

/// One serial update as requested by a technician.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub serial_number: String,
    pub role: String,
    pub technician_name: String,
}

impl ActionRequest {
    pub fn new(
        serial_number: impl Into<String>,
        technician_name: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            serial_number: serial_number.into(),
            role: role.into(),
            technician_name: technician_name.into(),
        }
    }
}

/// Body of the action call. Field names are the downstream wire contract.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActionPayload<'a> {
    pub serial_number: &'a str,
    pub role: &'a str,
    pub technician_name: &'a str,
}

impl<'a> From<&'a ActionRequest> for ActionPayload<'a> {
    fn from(request: &'a ActionRequest) -> Self {
        Self {
            serial_number: &request.serial_number,
            role: &request.role,
            technician_name: &request.technician_name,
        }
    }
}

/// Uniform outcome of an action call.
///
/// `error_code` is present exactly when `success` is false; the two
/// constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedResult {
    success: bool,
    message: String,
    reference_id: Option<String>,
    error_code: Option<String>,
}

impl NormalizedResult {
    pub fn succeeded(message: impl Into<String>, reference_id: Option<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            reference_id,
            error_code: None,
        }
    }

    pub fn failed(
        message: impl Into<String>,
        reference_id: Option<String>,
        error_code: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            message: message.into(),
            reference_id,
            error_code: Some(error_code.into()),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn reference_id(&self) -> Option<&str> {
        self.reference_id.as_deref()
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error_code.as_deref()
    }
}
