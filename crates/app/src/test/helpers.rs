//! Test Helpers

use crate::{
    domain::codes::{
        CodesService, CodesServiceError,
        data::{CodeUpload, UploadSummary},
    },
    test::TestContext,
};

pub(crate) async fn upload(
    ctx: &TestContext,
    codes: &[&str],
) -> Result<UploadSummary, CodesServiceError> {
    ctx.codes
        .upload_codes(CodeUpload {
            codes: codes.iter().map(ToString::to_string).collect(),
        })
        .await
}
