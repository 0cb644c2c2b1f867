pub mod annotate_frame_use_case;
