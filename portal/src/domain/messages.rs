//! Fixed user-facing copy, keyed by locale.
//!
//! Every canned message the portal shows without server input lives here so
//! adapters never hard-code strings of their own.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{ApiErrorKind, Role};

/// Supported display locales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Vietnamese, the portal's primary audience.
    #[default]
    Vi,
    /// English.
    En,
}

/// Error returned for an unrecognised locale tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported locale '{tag}'")]
pub struct UnsupportedLocaleError {
    /// The rejected tag.
    pub tag: String,
}

impl FromStr for Locale {
    type Err = UnsupportedLocaleError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let primary = tag.trim().split(['-', '_']).next().unwrap_or_default();
        match primary.to_ascii_lowercase().as_str() {
            "vi" => Ok(Self::Vi),
            "en" => Ok(Self::En),
            _ => Err(UnsupportedLocaleError {
                tag: tag.to_owned(),
            }),
        }
    }
}

impl Locale {
    /// Canned message for a classified gateway failure when the server did
    /// not supply one.
    pub fn fallback_message(self, kind: ApiErrorKind) -> String {
        let text = match (self, kind) {
            (_, ApiErrorKind::UnknownHttpError { status }) => {
                return match self {
                    Self::Vi => format!("Lỗi HTTP! Mã trạng thái: {status}"),
                    Self::En => format!("HTTP error! Status code: {status}"),
                };
            }
            (Self::Vi, ApiErrorKind::InvalidInput) => {
                "Dữ liệu không hợp lệ. Vui lòng kiểm tra lại thông tin đã nhập."
            }
            (Self::Vi, ApiErrorKind::SessionExpired) => {
                "Phiên đăng nhập đã hết hạn. Vui lòng đăng nhập lại."
            }
            (Self::Vi, ApiErrorKind::Forbidden) => "Bạn không có quyền thực hiện hành động này.",
            (Self::Vi, ApiErrorKind::NotFound) => "Không tìm thấy tài nguyên yêu cầu.",
            (Self::Vi, ApiErrorKind::ServerFault) => "Lỗi server nội bộ. Vui lòng thử lại sau.",
            (Self::Vi, ApiErrorKind::ServiceUnavailable) => {
                "Dịch vụ tạm thời không khả dụng. Vui lòng thử lại sau."
            }
            (Self::Vi, ApiErrorKind::NetworkUnreachable) => {
                "Không thể kết nối đến server. Vui lòng kiểm tra kết nối mạng và thử lại."
            }
            (Self::En, ApiErrorKind::InvalidInput) => {
                "Invalid data. Please check the information you entered."
            }
            (Self::En, ApiErrorKind::SessionExpired) => {
                "Your session has expired. Please sign in again."
            }
            (Self::En, ApiErrorKind::Forbidden) => {
                "You do not have permission to perform this action."
            }
            (Self::En, ApiErrorKind::NotFound) => "The requested resource was not found.",
            (Self::En, ApiErrorKind::ServerFault) => {
                "Internal server error. Please try again later."
            }
            (Self::En, ApiErrorKind::ServiceUnavailable) => {
                "The service is temporarily unavailable. Please try again later."
            }
            (Self::En, ApiErrorKind::NetworkUnreachable) => {
                "Cannot connect to the server. Please check your network connection and try again."
            }
        };
        text.to_owned()
    }

    /// Message used when a 2xx payload does not have the expected shape.
    pub fn unexpected_response(self) -> &'static str {
        match self {
            Self::Vi => "Phản hồi từ server không hợp lệ.",
            Self::En => "The server returned an unexpected response.",
        }
    }

    /// Inline sign-in form message for blank fields.
    pub fn fields_required(self) -> &'static str {
        match self {
            Self::Vi => "Vui lòng nhập đầy đủ thông tin",
            Self::En => "Please fill in all fields",
        }
    }

    /// Generic sign-in failure used when no better message exists.
    pub fn sign_in_failed(self) -> &'static str {
        match self {
            Self::Vi => "Đăng nhập thất bại",
            Self::En => "Sign-in failed",
        }
    }

    /// Message shown when a sign-in is already running.
    pub fn sign_in_in_progress(self) -> &'static str {
        match self {
            Self::Vi => "Đang xử lý...",
            Self::En => "Processing...",
        }
    }

    /// Label for a role, with a generic fallback when no role is known.
    pub fn role_label(self, role: Option<Role>) -> &'static str {
        match (self, role) {
            (Self::Vi, Some(Role::Admin)) => "Quản trị viên",
            (Self::Vi, Some(Role::Teacher)) => "Giảng viên",
            (Self::Vi, Some(Role::Student)) => "Sinh viên",
            (Self::Vi, None) => "Người dùng",
            (Self::En, Some(Role::Admin)) => "Administrator",
            (Self::En, Some(Role::Teacher)) => "Teacher",
            (Self::En, Some(Role::Student)) => "Student",
            (Self::En, None) => "User",
        }
    }

    /// Health check message for a reachable, healthy backend.
    pub fn backend_healthy(self) -> &'static str {
        match self {
            Self::Vi => "Backend đang hoạt động bình thường",
            Self::En => "Backend is operating normally",
        }
    }

    /// Health check message for a backend answering with an error status.
    pub fn backend_error_status(self, status: u16) -> String {
        match self {
            Self::Vi => format!("Backend phản hồi với lỗi: {status}"),
            Self::En => format!("Backend responded with error: {status}"),
        }
    }

    /// Health check message for an unreachable backend.
    pub fn backend_unreachable(self) -> &'static str {
        match self {
            Self::Vi => {
                "Không thể kết nối đến backend. Vui lòng kiểm tra xem server có đang chạy không."
            }
            Self::En => "Cannot reach the backend. Please check that the server is running.",
        }
    }

    /// Health check message for failures that are neither status nor
    /// connection errors.
    pub fn backend_unknown_failure(self) -> &'static str {
        match self {
            Self::Vi => "Lỗi không xác định khi kiểm tra kết nối backend",
            Self::En => "Unknown error while checking the backend connection",
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("vi", Locale::Vi)]
    #[case("vi-VN", Locale::Vi)]
    #[case("EN", Locale::En)]
    #[case("en_GB", Locale::En)]
    fn parses_locale_tags(#[case] tag: &str, #[case] expected: Locale) {
        assert_eq!(tag.parse::<Locale>().expect("supported tag"), expected);
    }

    #[test]
    fn rejects_unknown_locale() {
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn unknown_status_message_carries_status() {
        let message = Locale::En.fallback_message(ApiErrorKind::UnknownHttpError { status: 418 });
        assert_eq!(message, "HTTP error! Status code: 418");
    }

    #[rstest]
    #[case(Locale::Vi, None, "Người dùng")]
    #[case(Locale::Vi, Some(Role::Teacher), "Giảng viên")]
    #[case(Locale::En, Some(Role::Admin), "Administrator")]
    fn role_labels_cover_absent_role(
        #[case] locale: Locale,
        #[case] role: Option<Role>,
        #[case] expected: &str,
    ) {
        assert_eq!(locale.role_label(role), expected);
    }
}
