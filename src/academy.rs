//! Educational content and knowledge quiz for the Academy view.
//!
//! Static module content mirrors India's primary-market mechanics; the quiz
//! is a small state machine scored as the user answers.

/// Topic grouping for an academy module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Basics,
    Strategy,
    Policy,
    Advanced,
}

impl Category {
    /// Returns a short display label for the category.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Basics => "Basics",
            Category::Strategy => "Strategy",
            Category::Policy => "Policy",
            Category::Advanced => "Advanced",
        }
    }
}

/// One educational card in the Academy view.
#[derive(Debug, Clone, Copy)]
pub struct AcademyModule {
    #[allow(dead_code)]
    pub id: &'static str,
    pub title: &'static str,
    pub category: Category,
    /// One-line teaser shown on the card
    pub summary: &'static str,
    /// Bullet points shown when the module is expanded
    pub points: &'static [&'static str],
}

/// All academy modules, in display order.
pub fn all_modules() -> &'static [AcademyModule] {
    &[
        AcademyModule {
            id: "lifecycle",
            title: "The IPO Lifecycle",
            category: Category::Basics,
            summary: "From DRHP filing to the listing bell.",
            points: &[
                "01 DRHP - the draft prospectus filed with SEBI",
                "02 Roadshow - the pitch to institutions",
                "03 Listing - market debut on the exchange",
            ],
        },
        AcademyModule {
            id: "anchor-effect",
            title: "The Anchor Investor Effect",
            category: Category::Strategy,
            summary: "Decoding Smart Money signals.",
            points: &[
                "Big institutions buy 30 days before the IPO opens",
                "Strong anchor demand usually signals institutional confidence",
            ],
        },
        AcademyModule {
            id: "ofs-vs-fresh",
            title: "OFS vs Fresh Issue",
            category: Category::Basics,
            summary: "Where is the capital moving?",
            points: &[
                "Fresh Issue - the company raises money for growth",
                "OFS - existing founders sell their shares",
            ],
        },
        AcademyModule {
            id: "t3-listing",
            title: "T+3 Listing Rule",
            category: Category::Policy,
            summary: "Speed is the new market standard.",
            points: &[
                "SEBI mandates listing 3 working days after close",
                "Shorter capital lock-in for applicants",
            ],
        },
        AcademyModule {
            id: "sme-vs-main",
            title: "SME vs Mainboard",
            category: Category::Advanced,
            summary: "Risk, reward, and liquidity.",
            points: &[
                "Minimum application: Main ₹15k, SME ₹1.2L+",
                "SME issues carry higher volatility and thinner liquidity",
            ],
        },
        AcademyModule {
            id: "investor-quotas",
            title: "Quota Allocation",
            category: Category::Strategy,
            summary: "Who gets what in an IPO?",
            points: &["Retail: 35%", "QIB: 50%", "NII: 15%"],
        },
    ]
}

/// One multiple-choice quiz question.
#[derive(Debug, Clone, Copy)]
pub struct QuizQuestion {
    pub prompt: &'static str,
    pub choices: [&'static str; 4],
    /// Index into `choices` of the correct answer
    pub answer: usize,
    pub explanation: &'static str,
}

/// The quiz question bank, in asking order.
pub fn quiz_questions() -> &'static [QuizQuestion] {
    &[
        QuizQuestion {
            prompt: "How many working days after closing must an IPO list under current SEBI rules?",
            choices: ["1", "3", "6", "10"],
            answer: 1,
            explanation: "The T+3 rule mandates listing three working days after the issue closes.",
        },
        QuizQuestion {
            prompt: "When do anchor investors get their allocation?",
            choices: [
                "On listing day",
                "30 days after listing",
                "Before the IPO opens to the public",
                "During the retail window",
            ],
            answer: 2,
            explanation: "Anchor books are built shortly before the public issue opens; strong demand there signals institutional confidence.",
        },
        QuizQuestion {
            prompt: "In a typical mainboard IPO, which investor class holds the largest quota?",
            choices: ["Retail", "QIB", "NII", "Employees"],
            answer: 1,
            explanation: "Qualified institutional buyers are allotted 50%, against 35% retail and 15% NII.",
        },
        QuizQuestion {
            prompt: "What does a company receive from an Offer For Sale (OFS) component?",
            choices: [
                "Fresh growth capital",
                "Nothing - proceeds go to selling shareholders",
                "A tax rebate",
                "Anchor commitments",
            ],
            answer: 1,
            explanation: "OFS proceeds go to the exiting holders; only a fresh issue raises money for the company itself.",
        },
        QuizQuestion {
            prompt: "The grey-market premium (GMP) of an IPO is best described as…",
            choices: [
                "The exchange-guaranteed listing gain",
                "An unofficial premium traded before listing",
                "The underwriter's fee",
                "The minimum application amount",
            ],
            answer: 1,
            explanation: "GMP is an informal pre-listing signal, not a guarantee of listing price.",
        },
        QuizQuestion {
            prompt: "Compared to mainboard issues, SME IPOs typically have…",
            choices: [
                "Lower minimum application amounts",
                "Higher volatility and larger minimum lots",
                "Guaranteed allotment",
                "No lock-in for promoters",
            ],
            answer: 1,
            explanation: "SME lots start around ₹1.2L and trade with thinner liquidity, against roughly ₹15k on the mainboard.",
        },
    ]
}

/// Progress through the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quiz {
    /// Index of the question currently shown
    pub index: usize,
    /// Correct answers so far
    pub score: usize,
    /// The choice picked for the current question, once answered
    pub selected: Option<usize>,
    /// True once every question has been answered and advanced past
    pub finished: bool,
}

impl Default for Quiz {
    fn default() -> Self {
        Self::new()
    }
}

impl Quiz {
    /// Starts a fresh quiz at the first question.
    pub fn new() -> Self {
        Self {
            index: 0,
            score: 0,
            selected: None,
            finished: false,
        }
    }

    /// The question currently shown, if the quiz is still running.
    pub fn current(&self) -> Option<&'static QuizQuestion> {
        if self.finished {
            None
        } else {
            quiz_questions().get(self.index)
        }
    }

    /// Records an answer for the current question. Repeat answers and
    /// out-of-range choices are ignored.
    pub fn answer(&mut self, choice: usize) {
        if self.finished || self.selected.is_some() || choice >= 4 {
            return;
        }
        if let Some(question) = self.current() {
            self.selected = Some(choice);
            if choice == question.answer {
                self.score += 1;
            }
        }
    }

    /// Advances past an answered question. Does nothing until the current
    /// question has been answered.
    pub fn advance(&mut self) {
        if self.finished || self.selected.is_none() {
            return;
        }
        self.selected = None;
        self.index += 1;
        if self.index >= quiz_questions().len() {
            self.finished = true;
        }
    }

    /// Total number of questions.
    pub fn total(&self) -> usize {
        quiz_questions().len()
    }

    /// True when the score merits the Terminal Master badge (75% or more).
    pub fn passed(&self) -> bool {
        self.finished && self.score * 4 >= self.total() * 3
    }
}
