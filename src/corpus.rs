//! Seed corpus bundled with the resolver.
//!
//! One precedent per classifier category. This is the knowledge base used
//! whenever no persisted index exists on disk.

use sha2::{Digest, Sha256};

use crate::models::Document;

/// `(issue, content)` pairs in insertion order. Insertion order is the
/// retrieval tie-breaker, so do not reorder.
pub const SEED_CORPUS: [(&str, &str); 11] = [
    (
        "Information belongs to someone else (LABEL_0)",
        concat!(
            "Complaint: There is a mortgage account on my credit report that belongs to my twin brother. We have similar names but different SSNs. \n",
            "Resolution: This appears to be a 'mixed file' error. Under the FCRA, credit bureaus must ensure maximum possible accuracy. Action: Verify the consumer's personal identifiers (SSN, DOB). Separate the credit files immediately and send a confirmation of the correction.",
        ),
    ),
    (
        "Reporting company used your report improperly (LABEL_1)",
        concat!(
            "Complaint: A car dealership pulled my credit report yesterday, but I never visited them or applied for a loan. \n",
            "Resolution: Accessing a consumer report without 'permissible purpose' violates the FCRA. Action: Investigation required. If the dealership cannot prove the consumer applied for credit, the hard inquiry must be removed/suppressed from the report.",
        ),
    ),
    (
        "Their investigation did not fix an error on your report (LABEL_2)",
        concat!(
            "Complaint: I disputed a late payment charge last month. You said it was verified, but I have a bank statement proving I paid on time. \n",
            "Resolution: If a consumer provides new relevant information, the furnisher must conduct a reasonable reinvestigation. Action: Review the proof of payment provided. If valid, update the trade line to 'Current/Paid as Agreed' and notify all bureaus.",
        ),
    ),
    (
        "Account information incorrect (LABEL_3)",
        concat!(
            "Complaint: My credit card balance is showing as $5,000 on my report, but I paid it down to zero two weeks ago. \n",
            "Resolution: Data furnishing issues often occur due to reporting cycles. However, furnishers must report accurate information. Action: Check the 'Date Reported'. If the payment was made after that date, explain the cycle. If the report is outdated, trigger an off-cycle update (AUD) to correct the balance.",
        ),
    ),
    (
        "Account status incorrect (LABEL_4)",
        concat!(
            "Complaint: My closed auto loan is marked as 'Voluntary Surrender' but I paid it off in full. \n",
            "Resolution: Incorrect status codes can severely damage credit scores. Action: Audit the account history. If paid in full, update the account status code to '13' (Paid or closed/zero balance) or the appropriate Metro 2 code representing a positive closure.",
        ),
    ),
    (
        "Credit inquiries on your report that you don't recognize (LABEL_5)",
        concat!(
            "Complaint: I see three hard inquiries from 'ABC Lending' on Jan 15th. I did not apply for credit with them. \n",
            "Resolution: Unauthorized hard inquiries harm credit scores. Action: Validate permissible purpose with the inquirer. If fraud or error is confirmed, recode inquiries as 'soft' or delete them entirely.",
        ),
    ),
    (
        "Investigation took more than 30 days (LABEL_6)",
        concat!(
            "Complaint: I filed a dispute 40 days ago regarding a fraudulent charge, and I still haven't received a final decision. \n",
            "Resolution: The FCRA generally requires disputes to be resolved within 30 days. Failure to do so is a compliance violation. Action: Expedite the investigation immediately. If the information cannot be verified within the statutory window, the disputed item must be deleted from the file.",
        ),
    ),
    (
        "Debt is not yours (LABEL_7)",
        concat!(
            "Complaint: A collection agency is calling me about a $200 medical bill for a person named 'John Doe'. My name is 'Jane Smith'. \n",
            "Resolution: This is a violation of the FDCPA (Fair Debt Collection Practices Act). Action: Cease collection attempts immediately. Mark the debt as disputed and request validation of debt (VOD) from the original creditor. If confirmed as not belonging to the consumer, delete the trade line.",
        ),
    ),
    (
        "Was not notified of investigation status or results (LABEL_8)",
        concat!(
            "Complaint: You closed my dispute last week, but I never received a letter telling me if you fixed the error or not. \n",
            "Resolution: Consumers must be provided with the results of the reinvestigation (Notice of Results) within 5 business days of completion. Action: Resend the dispute resolution letter and a free copy of the updated credit report immediately.",
        ),
    ),
    (
        "Personal information incorrect (LABEL_9)",
        concat!(
            "Complaint: My last name is spelled 'Smyth' on my report, but it is actually 'Smith'. Also, my old address is listed as current. \n",
            "Resolution: Accuracy of header information is critical for identity verification. Action: Accept the consumer's proof of ID (Driver's License/Utility Bill). Update the name and address fields in the Metro 2 file header.",
        ),
    ),
    (
        "Other (LABEL_10)",
        concat!(
            "Complaint: The ATM took my card and didn't give it back, and I was late to work because of it. \n",
            "Resolution: This is a general service or hardware issue. Action: Block the captured card to prevent fraud. Issue a new card immediately via expedited shipping. Apologize for the inconvenience.",
        ),
    ),
];

/// The seed corpus as documents, in insertion order.
pub fn seed_documents() -> Vec<Document> {
    SEED_CORPUS
        .iter()
        .map(|(issue, content)| Document::new(*issue, *content))
        .collect()
}

/// SHA-256 over the ordered documents, hex encoded.
///
/// Recorded alongside a persisted index so a load can tell whether the
/// index was written from a different corpus.
pub fn corpus_fingerprint(documents: &[Document]) -> String {
    let mut hasher = Sha256::new();
    for doc in documents {
        hasher.update(doc.metadata.issue.as_bytes());
        hasher.update([0u8]);
        hasher.update(doc.content.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}
