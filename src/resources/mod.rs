pub mod member;
pub mod one_to_one;
pub mod referral;
pub mod tyfcb;

pub use member::{Member, MemberDirectory, MemberLists, MemberScope};
pub use one_to_one::{OneToOneDraft, OneToOneMeeting, OneToOnes};
pub use referral::{Referral, ReferralDraft, ReferralStatus, ReferralType, Referrals};
pub use tyfcb::{BusinessType, TyfcbDraft, TyfcbReferralType, TyfcbSlip, TyfcbSlips};
