pub mod sms;

pub mod types {
    #[derive(Clone, Debug)]
    pub struct VerificationOtpRequested {
        pub code: String,
        pub validity_minutes: i64,
    }
}

#[derive(Clone, Debug)]
pub enum Notification {
    VerificationOtpRequested(types::VerificationOtpRequested),
}

impl Notification {
    pub fn verification_otp_requested(code: String, validity_minutes: i64) -> Self {
        Notification::VerificationOtpRequested(types::VerificationOtpRequested {
            code,
            validity_minutes,
        })
    }

    /// Text of the message as delivered to the recipient.
    pub fn render(&self, sender_name: &str) -> String {
        match self {
            Notification::VerificationOtpRequested(n) => format!(
                "Your {} OTP is: {}. Valid for {} minutes. Do not share this code with anyone.",
                sender_name, n.code, n.validity_minutes
            ),
        }
    }
}
