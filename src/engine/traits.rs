use crate::appointment::Appointment;

pub trait OverlapRule {
    fn overlaps(&self, existing: &Appointment, candidate: &Appointment) -> bool;
}

impl<R: OverlapRule + ?Sized> OverlapRule for &R {
    fn overlaps(&self, existing: &Appointment, candidate: &Appointment) -> bool {
        (**self).overlaps(existing, candidate)
    }
}
