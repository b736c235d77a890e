pub mod contour_pupil_localizer;
