/// Admin-managed backend collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Blogs,
    Services,
    Treatments,
    TreatmentFaqs,
    UpcomingEvents,
    OngoingEvents,
    PatientSuccess,
    Testimonials,
    Jobs,
    Applications,
    Ebooks,
    Newsletter,
    Callbacks,
    Contacts,
    Addresses,
    Users,
}

impl Resource {
    pub fn all() -> &'static [Resource] {
        &[
            Self::Blogs,
            Self::Services,
            Self::Treatments,
            Self::TreatmentFaqs,
            Self::UpcomingEvents,
            Self::OngoingEvents,
            Self::PatientSuccess,
            Self::Testimonials,
            Self::Jobs,
            Self::Applications,
            Self::Ebooks,
            Self::Newsletter,
            Self::Callbacks,
            Self::Contacts,
            Self::Addresses,
            Self::Users,
        ]
    }

    /// Collection path relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Self::Blogs => "/blogs",
            Self::Services => "/services",
            Self::Treatments => "/treatments",
            Self::TreatmentFaqs => "/treatment-faqs",
            Self::UpcomingEvents => "/upcoming-events",
            Self::OngoingEvents => "/ongoing-events",
            Self::PatientSuccess => "/patient-success-stories",
            Self::Testimonials => "/testimonials",
            Self::Jobs => "/jobs",
            Self::Applications => "/applications",
            Self::Ebooks => "/ebooks",
            Self::Newsletter => "/newsletter",
            Self::Callbacks => "/callbacks",
            Self::Contacts => "/contact-us",
            Self::Addresses => "/addresses",
            Self::Users => "/users",
        }
    }

    /// Where new items are posted. Users register through a separate route.
    pub fn create_path(&self) -> &'static str {
        match self {
            Self::Users => "/users/register",
            other => other.path(),
        }
    }

    pub fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.path(), id)
    }

    /// Plural label used in "Failed to load ..." messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Blogs => "blogs",
            Self::Services => "services",
            Self::Treatments => "treatments",
            Self::TreatmentFaqs => "treatment FAQs",
            Self::UpcomingEvents => "upcoming events",
            Self::OngoingEvents => "ongoing events",
            Self::PatientSuccess => "patient success stories",
            Self::Testimonials => "testimonials",
            Self::Jobs => "jobs",
            Self::Applications => "applications",
            Self::Ebooks => "ebooks",
            Self::Newsletter => "subscribers",
            Self::Callbacks => "callbacks",
            Self::Contacts => "contacts",
            Self::Addresses => "addresses",
            Self::Users => "users",
        }
    }

    /// Singular label used in create/update/delete messages.
    pub fn singular(&self) -> &'static str {
        match self {
            Self::Blogs => "blog",
            Self::Services => "service",
            Self::Treatments => "treatment",
            Self::TreatmentFaqs => "treatment FAQ",
            Self::UpcomingEvents => "upcoming event",
            Self::OngoingEvents => "ongoing event",
            Self::PatientSuccess => "patient success story",
            Self::Testimonials => "testimonial",
            Self::Jobs => "job",
            Self::Applications => "application",
            Self::Ebooks => "ebook",
            Self::Newsletter => "subscriber",
            Self::Callbacks => "callback",
            Self::Contacts => "contact",
            Self::Addresses => "address",
            Self::Users => "user",
        }
    }

    /// CLI name, e.g. `treatment-faqs`.
    pub fn slug(&self) -> &'static str {
        self.path().trim_start_matches('/')
    }

    pub fn parse(s: &str) -> Option<Self> {
        let wanted = s.trim().trim_start_matches('/').to_lowercase();
        Self::all().iter().copied().find(|r| {
            r.slug() == wanted || r.label().replace(' ', "-").to_lowercase() == wanted
        })
    }
}
